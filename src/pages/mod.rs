//! Page controllers
//!
//! Each page owns its form state and exposes async actions taking `&mut self`.
//! Progress is published through a [`BusyFlag`] handle that can be read while
//! an action is pending. Dropping an action's future cancels it and lowers
//! the flag, so a torn-down page is never left loading.

mod login;
mod mentors;
mod profile;
mod register;

pub use login::LoginPage;
pub use mentors::MentorDirectory;
pub use profile::ProfilePage;
pub use register::{RegisterPage, RegistrationForm, DEFAULT_DEPARTMENT, DEPARTMENTS};

// `BusyFlag` is defined below and exported from here

use std::sync::Arc;

use log::warn;
use tokio::sync::watch;

use crate::error::Error;

/// Whether a page action (submit, load) is in flight.
///
/// Clones share the same state, so a handle taken before an action starts
/// observes it while the page itself is borrowed by that action.
#[derive(Debug, Clone)]
pub struct BusyFlag(Arc<watch::Sender<bool>>);

impl BusyFlag {
    fn new(busy: bool) -> Self {
        let (sender, _) = watch::channel(busy);
        Self(Arc::new(sender))
    }

    pub fn get(&self) -> bool {
        *self.0.borrow()
    }

    /// Receiver that is notified whenever the flag flips
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }

    fn set(&self, busy: bool) {
        self.0.send_replace(busy);
    }

    fn raise(&self) -> Busy {
        self.set(true);
        Busy(self.clone())
    }
}

/// Keeps a [`BusyFlag`] raised for as long as it lives
struct Busy(BusyFlag);

impl Drop for Busy {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Message shown inline for a failed action.
///
/// Backend and identity errors carry a message meant for the user; anything
/// else (transport, decoding) is logged and replaced with `fallback`.
fn inline_message(error: &Error, fallback: &str) -> String {
    match error {
        Error::Identity(_) => error.to_string(),
        _ if error.status().is_some() => error.to_string(),
        _ => {
            warn!("{}", error);
            fallback.to_string()
        }
    }
}
