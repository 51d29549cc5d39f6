use log::warn;

use super::BusyFlag;
use crate::api::{ApiClient, User};

/// Searchable directory of mentors and staff
pub struct MentorDirectory {
    api: ApiClient,
    mentors: Vec<User>,
    loading: BusyFlag,
    /// Case-insensitive match against name or expertise
    pub search: String,
    /// `None` shows every department
    pub department: Option<String>,
}

impl MentorDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            mentors: Vec::new(),
            loading: BusyFlag::new(true),
            search: String::new(),
            department: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Handle that reports whether the directory is still loading
    pub fn loading(&self) -> BusyFlag {
        self.loading.clone()
    }

    pub fn mentors(&self) -> &[User] {
        &self.mentors
    }

    /// Fetch the directory; a failure is logged and leaves it empty
    pub async fn load(&mut self) {
        let _busy = self.loading.raise();
        self.mentors = match self.api.list_mentors().await {
            Ok(mentors) => mentors,
            Err(e) => {
                warn!("Failed to load mentors: {}", e);
                Vec::new()
            }
        };
    }

    pub fn filtered(&self) -> Vec<&User> {
        let query = self.search.trim().to_lowercase();
        self.mentors
            .iter()
            .filter(|mentor| {
                query.is_empty()
                    || mentor.full_name.to_lowercase().contains(&query)
                    || mentor
                        .expertise
                        .as_deref()
                        .map_or(false, |e| e.to_lowercase().contains(&query))
            })
            .filter(|mentor| match &self.department {
                Some(department) => mentor.department.as_deref() == Some(department.as_str()),
                None => true,
            })
            .collect()
    }

    /// Distinct departments, in the order they first appear
    pub fn departments(&self) -> Vec<&str> {
        let mut departments: Vec<&str> = Vec::new();
        for department in self.mentors.iter().filter_map(|m| m.department.as_deref()) {
            if !department.is_empty() && !departments.contains(&department) {
                departments.push(department);
            }
        }
        departments
    }
}
