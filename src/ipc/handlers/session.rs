use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::platform::PlatformError;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = match required_str(req, "username") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let password = match required_str(req, "password") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(platform) = state.platform.as_mut() else {
        return err(&req.id, "not_connected", "connect to the platform first", None);
    };

    match platform.login(&username, &password) {
        Ok(session) => {
            tracing::info!(user = %username, "logged in");
            let issued_at = session.issued_at.to_rfc3339();
            state.session = Some(session);
            ok(&req.id, json!({ "username": username, "issuedAt": issued_at }))
        }
        Err(PlatformError::Unauthorized) => {
            state.session = None;
            err(&req.id, "unauthorized", "invalid credentials", None)
        }
        Err(e) => err(&req.id, "platform_error", e.to_string(), None),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Logging out ends the authoring session too; the draft belongs to it.
    state.session = None;
    state.draft = None;
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
