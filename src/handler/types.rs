use serde::{Deserialize, Serialize};

use crate::Error;

/// Literal prefix on every client-error body, so callers can tell their own
/// mistakes apart from server-side faults.
pub const CLIENT_ERROR_PREFIX: &str = "Error processing request: ";

/// Per-call input supplied by the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub body: String,
    #[serde(default, rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

/// The sole output artifact returned to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Decoded request payload: the one required field.
#[derive(Debug, Deserialize)]
pub(crate) struct PromptPayload {
    pub prompt: String,
}

impl InvocationResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// Maps error variants to status codes: client input errors become a 400
    /// with the documented prefix, everything else a 500.
    pub fn from_error(err: &Error) -> Self {
        if err.is_client_error() {
            Self {
                status_code: 400,
                body: format!("{CLIENT_ERROR_PREFIX}{err}"),
            }
        } else {
            Self {
                status_code: 500,
                body: format!("Internal error: {err}"),
            }
        }
    }
}
