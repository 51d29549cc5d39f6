use log::info;

use super::{inline_message, BusyFlag};
use crate::api::{ApiClient, Role, UserCreate};
use crate::routes::{Navigation, RegisterMode, Route};
use crate::session::SessionStore;
use crate::validation::{self, RegistrationChecks};

pub const DEPARTMENTS: [&str; 4] = [
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Information Technology",
];

pub const DEFAULT_DEPARTMENT: &str = DEPARTMENTS[0];

const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Registration form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub student_id: String,
    pub department: String,
    pub year_of_study: String,
    pub bio: String,
    pub expertise: String,
    pub availability: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::Student,
            student_id: String::new(),
            department: DEFAULT_DEPARTMENT.to_string(),
            year_of_study: "1".to_string(),
            bio: String::new(),
            expertise: String::new(),
            availability: String::new(),
        }
    }
}

impl RegistrationForm {
    /// Fields that must be filled for the selected role, as (name, label)
    pub fn required_fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut fields = vec![
            ("full_name", "Full Name"),
            ("email", "Email"),
            ("password", "Password"),
            ("department", "Department"),
        ];
        match self.role {
            Role::Student => {
                fields.push(("student_id", "Student Registration No"));
                fields.push(("year_of_study", "Year of Study"));
            }
            Role::Mentor | Role::Staff => {
                fields.push(("expertise", "Expertise"));
                fields.push(("availability", "Availability"));
                fields.push(("bio", "Bio"));
            }
        }
        fields
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "full_name" => &self.full_name,
            "email" => &self.email,
            "password" => &self.password,
            "student_id" => &self.student_id,
            "department" => &self.department,
            "year_of_study" => &self.year_of_study,
            "bio" => &self.bio,
            "expertise" => &self.expertise,
            "availability" => &self.availability,
            _ => "",
        }
    }

    /// Label of the first required field left blank
    pub fn first_missing(&self) -> Option<&'static str> {
        self.required_fields()
            .into_iter()
            .find(|(name, _)| self.value(name).trim().is_empty())
            .map(|(_, label)| label)
    }

    fn payload(&self) -> UserCreate {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        UserCreate {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            student_id: self.student_id.trim().to_string(),
            department: self.department.clone(),
            year_of_study: self.year_of_study.clone(),
            role: self.role,
            bio: optional(&self.bio),
            expertise: optional(&self.expertise),
            availability: optional(&self.availability),
        }
    }
}

/// Role-aware registration, also used to complete a provider-only profile
pub struct RegisterPage {
    api: ApiClient,
    store: SessionStore,
    mode: Option<RegisterMode>,
    pub form: RegistrationForm,
    submitting: BusyFlag,
    error: Option<String>,
}

impl RegisterPage {
    /// Build the page for `route`, prefilling the email in complete-profile mode
    pub fn new(api: ApiClient, store: SessionStore, route: &Route) -> Self {
        let mut form = RegistrationForm::default();
        let mode = match route {
            Route::Register { mode, email } => {
                if let (Some(RegisterMode::CompleteProfile), Some(email)) = (mode, email) {
                    form.email = email.clone();
                }
                *mode
            }
            _ => None,
        };

        Self {
            api,
            store,
            mode,
            form,
            submitting: BusyFlag::new(false),
            error: None,
        }
    }

    pub fn is_completing_profile(&self) -> bool {
        self.mode == Some(RegisterMode::CompleteProfile)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    /// Handle that reports whether a registration request is pending
    pub fn submitting(&self) -> BusyFlag {
        self.submitting.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Live password and email checks for the current field values
    pub fn checks(&self) -> RegistrationChecks {
        RegistrationChecks::evaluate(&self.form.email, &self.form.password, self.form.role)
    }

    pub fn can_submit(&self) -> bool {
        self.checks().can_submit()
    }

    /// Validate locally, then register; on success the email is stored and
    /// the profile page is next
    pub async fn submit(&mut self) -> Option<Navigation> {
        self.error = None;

        if let Some(label) = self.form.first_missing() {
            self.error = Some(format!("Please fill in {}", label));
            return None;
        }
        if let Err(e) =
            validation::validate_submission(&self.form.email, &self.form.password, self.form.role)
        {
            self.error = Some(e.to_string());
            return None;
        }

        let payload = self.form.payload();
        let busy = self.submitting.raise();
        let result = self.api.register(&payload).await;
        drop(busy);

        match result {
            Ok(user) => {
                if let Err(e) = self.store.set(&user.email) {
                    self.error = Some(inline_message(&e, REGISTER_FALLBACK));
                    return None;
                }
                info!("Registered {} as {}", user.email, user.role);
                Some(Navigation::to(Route::Profile))
            }
            Err(e) => {
                self.error = Some(inline_message(&e, REGISTER_FALLBACK));
                None
            }
        }
    }
}
