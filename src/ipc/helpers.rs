use serde_json::Value;

use crate::draft::{SlotField, Weekday};
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::platform::PlatformError;

/// Non-empty string param, trimmed. Missing or empty is a `bad_params` reply.
pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// String param that may legitimately be empty (clearing a field).
pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

/// The `day` param: wire number 1..5 or a weekday name.
pub fn required_day(req: &Request) -> Result<Weekday, Value> {
    let day = match req.params.get("day") {
        Some(v) if v.is_i64() || v.is_u64() => v.as_i64().and_then(Weekday::from_wire),
        Some(v) => v.as_str().and_then(Weekday::from_name),
        None => None,
    };
    day.ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            "day must be 1..5 or Monday..Friday",
            None,
        )
    })
}

pub fn required_field(req: &Request) -> Result<SlotField, Value> {
    req.params
        .get("field")
        .and_then(|v| v.as_str())
        .and_then(SlotField::from_name)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "field must be one of startTime, endTime, subjectId, staffId, room",
                None,
            )
        })
}

/// Maps a platform failure onto the IPC envelope. An unauthorized reply means
/// the stored session is no longer valid, so it is dropped here; the UI must
/// send the user back through login.
pub fn platform_failure(state: &mut AppState, req: &Request, e: PlatformError) -> Value {
    match e {
        PlatformError::Unauthorized => {
            tracing::warn!("platform rejected the session token");
            state.session = None;
            err(
                &req.id,
                "unauthorized",
                "session is no longer valid; log in again",
                None,
            )
        }
        e => err(&req.id, "platform_error", e.to_string(), None),
    }
}
