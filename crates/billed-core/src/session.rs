//! Current user, passed explicitly to the page controllers

use billed_config::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::types::UserType;

/// The connected user, in the `{"type": ..., "email": ...}` shape of the `user` cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    #[serde(default)]
    pub email: String,
}

impl Session {
    pub fn new(user_type: UserType, email: impl Into<String>) -> Self {
        Self {
            user_type,
            email: email.into(),
        }
    }

    pub fn employee(email: impl Into<String>) -> Self {
        Self::new(UserType::Employee, email)
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.user_type, config.email.clone())
    }

    /// Parse the JSON stored in the `user` cookie
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Session>(raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::debug!("ignoring malformed user cookie: {}", e);
                None
            }
        }
    }
}
