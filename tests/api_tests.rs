use reqwest::{Client, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yic_portal::api::{ApiClient, Role, UserCreate, UserLogin};
use yic_portal::config::normalize_api_base;
use yic_portal::error::Error;

fn user_json(email: &str) -> serde_json::Value {
    json!({
        "id": "7d1c2f4e-5a0b-4c1d-9e8f-123456789abc",
        "email": email,
        "full_name": "Amina Otieno",
        "student_id": "SCT211-0001/2022",
        "department": "Computer Science",
        "year_of_study": "2",
        "points": 120,
        "joined_at": "2024-02-01T09:30:00",
        "role": "student",
        "is_verified": true
    })
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&normalize_api_base(&server.uri()), Client::new())
}

fn student_payload() -> UserCreate {
    UserCreate {
        email: "a@x.ac.ke".to_string(),
        password: "Abcdef1!".to_string(),
        full_name: "Amina Otieno".to_string(),
        student_id: "SCT211-0001/2022".to_string(),
        department: "Computer Science".to_string(),
        year_of_study: "1".to_string(),
        role: Role::Student,
        bio: None,
        expertise: None,
        availability: None,
    }
}

#[tokio::test]
async fn test_register() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/register"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "email": "a@x.ac.ke",
            "password": "Abcdef1!",
            "full_name": "Amina Otieno",
            "student_id": "SCT211-0001/2022",
            "department": "Computer Science",
            "year_of_study": "1",
            "role": "student"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a@x.ac.ke")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = client_for(&mock_server)
        .register(&student_payload())
        .await
        .unwrap();

    assert_eq!(user.email, "a@x.ac.ke");
    assert_eq!(user.points, 120);
    assert!(user.is_verified);
}

#[tokio::test]
async fn test_register_flattens_field_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                { "loc": ["body", "email"], "msg": "value is not a valid email address" },
                { "loc": ["body", "student_id"], "msg": "field required" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .register(&student_payload())
        .await
        .unwrap_err();

    match err {
        Error::Validation { status, message } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(message, "value is not a valid email address, field required");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Email already registered"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .register(&student_payload())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Email already registered");
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .and(body_json(json!({ "email": "a@x.ac.ke", "password": "Abcdef1!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a@x.ac.ke")))
        .mount(&mock_server)
        .await;

    let credentials = UserLogin {
        email: "a@x.ac.ke".to_string(),
        password: "Abcdef1!".to_string(),
    };
    let user = client_for(&mock_server).login(&credentials).await.unwrap();

    assert_eq!(user.full_name, "Amina Otieno");
    assert_eq!(user.role, Role::Student);
}

#[tokio::test]
async fn test_login_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Invalid email or password"
        })))
        .mount(&mock_server)
        .await;

    let credentials = UserLogin {
        email: "a@x.ac.ke".to_string(),
        password: "wrong".to_string(),
    };
    let err = client_for(&mock_server)
        .login(&credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { status, .. } if status == StatusCode::UNAUTHORIZED));
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_login_unparsable_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let credentials = UserLogin {
        email: "a@x.ac.ke".to_string(),
        password: "Abcdef1!".to_string(),
    };
    let err = client_for(&mock_server)
        .login(&credentials)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn test_get_current_user_encodes_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(query_param("email", "a+b@x.ac.ke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a+b@x.ac.ke")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = client_for(&mock_server)
        .get_current_user("a+b@x.ac.ke")
        .await
        .unwrap();

    assert_eq!(user.email, "a+b@x.ac.ke");
}

#[tokio::test]
async fn test_get_current_user_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "User not found"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .get_current_user("ghost@x.ac.ke")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, Error::UserLookup { .. }));
    assert_eq!(err.to_string(), "User not found");
}

#[tokio::test]
async fn test_get_current_user_without_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .get_current_user("a@x.ac.ke")
        .await
        .unwrap_err();

    assert!(!err.is_not_found());
    assert_eq!(err.to_string(), "Failed to fetch profile");
}

#[tokio::test]
async fn test_list_mentors() {
    let mock_server = MockServer::start().await;

    let mut mentor = user_json("mentor@gmail.com");
    mentor["role"] = json!("mentor");
    mentor["expertise"] = json!("Machine Learning");

    Mock::given(method("GET"))
        .and(path("/api/v1/users/mentors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([mentor])))
        .mount(&mock_server)
        .await;

    let mentors = client_for(&mock_server).list_mentors().await.unwrap();

    assert_eq!(mentors.len(), 1);
    assert_eq!(mentors[0].role, Role::Mentor);
    assert_eq!(mentors[0].expertise.as_deref(), Some("Machine Learning"));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // nothing listens on port 9 (discard)
    let client = ApiClient::new("http://127.0.0.1:9/api/v1", Client::new());

    let err = client.list_mentors().await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}
