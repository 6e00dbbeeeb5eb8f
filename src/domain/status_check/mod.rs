//! Diagnostic status checks recorded by `POST /api/status`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StatusCheckId, Timestamp, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: StatusCheckId,
    pub client_name: String,
    pub timestamp: Timestamp,
}

impl StatusCheck {
    pub fn new(client_name: impl Into<String>, now: Timestamp) -> Result<Self, ValidationError> {
        let client_name = client_name.into();
        if client_name.trim().is_empty() {
            return Err(ValidationError::empty_field("client_name"));
        }
        Ok(Self {
            id: StatusCheckId::new(),
            client_name,
            timestamp: now,
        })
    }
}
