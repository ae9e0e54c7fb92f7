//! Per-invocation request handling.
//!
//! Stateless across invocations: decode the event body, extract the prompt,
//! run generation, serialize the result. Decode and parse failures are one
//! failure domain, reported as a 400 response; nothing is retried.

mod types;

pub use types::{InvocationEvent, InvocationResponse, CLIENT_ERROR_PREFIX};

use base64::{engine::general_purpose, Engine as _};
use tracing::{error, info, warn};

use crate::engine::CompletionEngine;
use crate::{Error, Result};

/// Decodes the transport framing: base64 + UTF-8 when the event says so,
/// otherwise the body text as-is.
pub fn decode_body(event: &InvocationEvent) -> Result<String> {
    if event.is_base64_encoded {
        let bytes = general_purpose::STANDARD.decode(&event.body)?;
        Ok(String::from_utf8(bytes)?)
    } else {
        Ok(event.body.clone())
    }
}

/// Parses the decoded body as JSON and extracts the required `prompt` field.
pub fn extract_prompt(body: &str) -> Result<String> {
    serde_json::from_str::<types::PromptPayload>(body)
        .map(|payload| payload.prompt)
        .map_err(|e| Error::payload(e.to_string()))
}

/// Handles one invocation event end to end.
pub async fn invoke(engine: &dyn CompletionEngine, event: InvocationEvent) -> InvocationResponse {
    info!("Received invocation event: {:?}", event);

    let prompt = match decode_body(&event).and_then(|body| extract_prompt(&body)) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Rejecting invocation: {}", e);
            return InvocationResponse::from_error(&e);
        }
    };

    match engine.complete(&prompt).await {
        Ok(completion) => match serde_json::to_string(&completion) {
            Ok(body) => InvocationResponse::ok(body),
            Err(e) => {
                error!("Failed to serialize completion: {}", e);
                InvocationResponse::from_error(&Error::from(e))
            }
        },
        Err(e) => {
            error!("Generation failed for invocation: {}", e);
            InvocationResponse::from_error(&e)
        }
    }
}
