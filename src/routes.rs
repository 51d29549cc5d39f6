//! Client-side routes and navigation outcomes

use std::fmt;

use url::form_urlencoded;

/// Mode flag carried by `/register`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterMode {
    /// The identity is known to the provider but not to the backend
    CompleteProfile,
}

impl RegisterMode {
    fn as_str(&self) -> &'static str {
        match self {
            RegisterMode::CompleteProfile => "complete_profile",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "complete_profile" => Some(RegisterMode::CompleteProfile),
            _ => None,
        }
    }
}

/// Percent-decoded path segment; malformed escapes are kept as written
fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Application routes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    About,
    Blog,
    BlogPost(String),
    Activities,
    Activity(String),
    Profile,
    Dashboard,
    Contact,
    Login,
    Register {
        mode: Option<RegisterMode>,
        email: Option<String>,
    },
    AdminActivities,
    Mentors,
    NotFound,
}

impl Route {
    /// Plain `/register`
    pub fn register() -> Self {
        Route::Register {
            mode: None,
            email: None,
        }
    }

    /// `/register?mode=complete_profile&email=..`
    pub fn complete_profile(email: &str) -> Self {
        Route::Register {
            mode: Some(RegisterMode::CompleteProfile),
            email: Some(email.to_string()),
        }
    }

    /// Parse a path with an optional query string
    pub fn parse(location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, ""),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            [""] => Route::Home,
            ["about"] => Route::About,
            ["blog"] => Route::Blog,
            ["blog", id] => Route::BlogPost(decode_segment(id)),
            ["activities"] => Route::Activities,
            ["activities", id] => Route::Activity(decode_segment(id)),
            ["profile"] => Route::Profile,
            ["dashboard"] => Route::Dashboard,
            ["contact"] => Route::Contact,
            ["login"] => Route::Login,
            ["register"] => {
                let mut mode = None;
                let mut email = None;
                for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                    match key.as_ref() {
                        "mode" => mode = RegisterMode::parse(&value),
                        "email" if !value.is_empty() => email = Some(value.into_owned()),
                        _ => {}
                    }
                }
                Route::Register { mode, email }
            }
            ["admin", "activities"] => Route::AdminActivities,
            ["mentors"] => Route::Mentors,
            _ => Route::NotFound,
        }
    }

    /// The URL path (and query) for this route
    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Blog => "/blog".to_string(),
            Route::BlogPost(id) => format!("/blog/{}", urlencoding::encode(id)),
            Route::Activities => "/activities".to_string(),
            Route::Activity(id) => format!("/activities/{}", urlencoding::encode(id)),
            Route::Profile => "/profile".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register { mode, email } => {
                let mut query = Vec::new();
                if let Some(mode) = mode {
                    query.push(format!("mode={}", mode.as_str()));
                }
                if let Some(email) = email {
                    query.push(format!("email={}", urlencoding::encode(email)));
                }
                if query.is_empty() {
                    "/register".to_string()
                } else {
                    format!("/register?{}", query.join("&"))
                }
            }
            Route::AdminActivities => "/admin/activities".to_string(),
            Route::Mentors => "/mentors".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

/// Where a page action wants to go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    /// A full page load rather than an in-app transition
    pub full_reload: bool,
}

impl Navigation {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            full_reload: false,
        }
    }

    pub fn reload(route: Route) -> Self {
        Self {
            route,
            full_reload: true,
        }
    }
}
