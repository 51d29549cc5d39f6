//! Types exchanged with the backend API

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Member role; gates which profile fields matter and which email domains are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Mentor,
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Mentor, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "mentor" => Ok(Role::Mentor),
            "staff" => Ok(Role::Staff),
            other => Err(Error::general(format!("Unknown role: {}", other))),
        }
    }
}

/// User data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address, unique per member
    pub email: String,

    /// The user's display name
    pub full_name: String,

    /// Student registration number
    #[serde(default)]
    pub student_id: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub year_of_study: Option<String>,

    /// Accumulated reward points
    #[serde(default)]
    pub points: u32,

    /// When the member joined, as sent by the backend
    pub joined_at: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub expertise: Option<String>,

    #[serde(default)]
    pub availability: Option<String>,

    #[serde(default)]
    pub is_verified: bool,
}

impl User {
    /// Parse `joined_at`, accepting both RFC 3339 and offset-less timestamps
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.joined_at) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.joined_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// Registration payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub student_id: String,
    pub department: String,
    pub year_of_study: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}
