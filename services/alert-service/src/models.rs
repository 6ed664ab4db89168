use serde::Serialize;

use crate::payload::AlertPayload;

pub const STATUS_SENT: &str = "sent";

/// Acknowledgment echoed back for every accepted alert.
#[derive(Serialize)]
pub struct AlertResponse {
    pub status: &'static str,
    pub payload: AlertPayload,
}

impl AlertResponse {
    pub fn sent(payload: AlertPayload) -> Self {
        Self {
            status: STATUS_SENT,
            payload,
        }
    }
}
