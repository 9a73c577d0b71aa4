//! Decoding typed records from model output.

use serde::de::DeserializeOwned;

use crate::error::{InspectError, Result};

/// Deserialize the outermost JSON object found in `raw`.
///
/// Text before the first `{` and after the last `}` is ignored, so reasoning
/// preambles and code fences around the object are tolerated.
pub fn parse_record<T: DeserializeOwned>(stage: &'static str, raw: &str) -> Result<T> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(InspectError::MalformedResponse {
            stage,
            message: "no JSON object in response".to_string(),
        });
    };
    if end < start {
        return Err(InspectError::MalformedResponse {
            stage,
            message: "no JSON object in response".to_string(),
        });
    }

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| InspectError::MalformedResponse { stage, message: e.to_string() })
}
