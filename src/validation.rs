//! Registration form validation
//!
//! Nothing here is stored: the register page recomputes the checks from the
//! current field values on every change.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::api::Role;

/// Suffix every institutional (university) address ends with
pub const INSTITUTIONAL_SUFFIX: &str = ".ac.ke";

/// Public mail provider accepted for mentors and staff
pub const PUBLIC_SUFFIX: &str = "@gmail.com";

/// Characters that satisfy the "special character" rule
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const STUDENT_EMAIL_ERROR: &str = "Students must use email ending with .ac.ke";
pub const MEMBER_EMAIL_ERROR: &str = "Email must end with .ac.ke or @gmail.com";

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").expect("valid regex"));
static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").expect("valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("valid regex"));
static SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("valid regex"));

/// Why a registration was refused before reaching the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    IncompleteEmail,

    #[error("{0}")]
    EmailDomain(&'static str),

    #[error("Please meet all password requirements")]
    WeakPassword,
}

/// The five password predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordChecks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordChecks {
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            uppercase: UPPERCASE.is_match(password),
            lowercase: LOWERCASE.is_match(password),
            digit: DIGIT.is_match(password),
            special: SPECIAL.is_match(password),
        }
    }

    /// Number of satisfied predicates, 0 through 5
    pub fn strength(&self) -> u8 {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.digit,
            self.special,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as u8
    }

    pub fn is_valid(&self) -> bool {
        self.strength() == 5
    }
}

/// An address the user has not finished typing yet
pub fn is_incomplete_email(email: &str) -> bool {
    email.chars().count() < 5 || !email.contains('@')
}

/// The domain error for `email` under `role`, or `None`.
///
/// Incomplete addresses never report an error.
pub fn email_error(email: &str, role: Role) -> Option<&'static str> {
    if is_incomplete_email(email) {
        return None;
    }

    let email = email.trim().to_lowercase();
    let institutional = email.ends_with(INSTITUTIONAL_SUFFIX);

    match role {
        Role::Student if !institutional => Some(STUDENT_EMAIL_ERROR),
        Role::Mentor | Role::Staff if !institutional && !email.ends_with(PUBLIC_SUFFIX) => {
            Some(MEMBER_EMAIL_ERROR)
        }
        _ => None,
    }
}

/// Live state of the registration form checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationChecks {
    pub password: PasswordChecks,
    pub email_error: Option<&'static str>,
}

impl RegistrationChecks {
    pub fn evaluate(email: &str, password: &str, role: Role) -> Self {
        Self {
            password: PasswordChecks::evaluate(password),
            email_error: email_error(email, role),
        }
    }

    /// Submit is enabled only with a full-strength password and no email error
    pub fn can_submit(&self) -> bool {
        self.password.is_valid() && self.email_error.is_none()
    }
}

/// Re-run every check at submit time
pub fn validate_submission(email: &str, password: &str, role: Role) -> Result<(), ValidationError> {
    if is_incomplete_email(email.trim()) {
        return Err(ValidationError::IncompleteEmail);
    }
    if let Some(message) = email_error(email, role) {
        return Err(ValidationError::EmailDomain(message));
    }
    if !PasswordChecks::evaluate(password).is_valid() {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_counts_each_predicate() {
        let cases = [
            ("", 0),
            ("abc", 1),
            ("abcdefgh", 2),
            ("Abcdefgh", 3),
            ("Abcdefg1", 4),
            ("Abcdef1!", 5),
            ("ABCDEF1!", 4),
            ("Ab1!", 4),
        ];
        for (password, expected) in cases {
            assert_eq!(
                PasswordChecks::evaluate(password).strength(),
                expected,
                "password {:?}",
                password
            );
        }
    }

    #[test]
    fn every_listed_special_character_counts() {
        for c in SPECIAL_CHARACTERS.chars() {
            assert!(PasswordChecks::evaluate(&c.to_string()).special, "{}", c);
        }
        assert!(!PasswordChecks::evaluate("-_=+~").special);
    }

    #[test]
    fn student_emails_must_be_institutional() {
        assert_eq!(email_error("a@x.ac.ke", Role::Student), None);
        assert_eq!(email_error("A@UON.AC.KE", Role::Student), None);
        assert_eq!(email_error("a@gmail.com", Role::Student), Some(STUDENT_EMAIL_ERROR));
    }

    #[test]
    fn mentors_and_staff_may_use_gmail() {
        for role in [Role::Mentor, Role::Staff] {
            assert_eq!(email_error("mentor@gmail.com", role), None);
            assert_eq!(email_error("lecturer@uon.ac.ke", role), None);
            assert_eq!(email_error("someone@yahoo.com", role), Some(MEMBER_EMAIL_ERROR));
        }
    }

    #[test]
    fn incomplete_emails_report_nothing() {
        for role in Role::ALL {
            assert_eq!(email_error("a@b", role), None);
            assert_eq!(email_error("abcdefgh", role), None);
            assert_eq!(email_error("", role), None);
        }
    }

    #[test]
    fn submit_gating() {
        assert!(RegistrationChecks::evaluate("a@x.ac.ke", "Abcdef1!", Role::Student).can_submit());
        assert!(!RegistrationChecks::evaluate("a@gmail.com", "Abcdef1!", Role::Student).can_submit());
        assert!(!RegistrationChecks::evaluate("a@x.ac.ke", "Abcdef1", Role::Student).can_submit());
        // incomplete email does not block the button, only the submit itself
        assert!(RegistrationChecks::evaluate("a@x", "Abcdef1!", Role::Student).can_submit());
        assert_eq!(
            validate_submission("a@x", "Abcdef1!", Role::Student),
            Err(ValidationError::IncompleteEmail)
        );
    }

    #[test]
    fn submission_reports_first_failure() {
        assert_eq!(
            validate_submission("a@gmail.com", "weak", Role::Student),
            Err(ValidationError::EmailDomain(STUDENT_EMAIL_ERROR))
        );
        assert_eq!(
            validate_submission("a@gmail.com", "weak", Role::Mentor),
            Err(ValidationError::WeakPassword)
        );
        assert_eq!(validate_submission("a@x.ac.ke", "Abcdef1!", Role::Student), Ok(()));
    }
}
