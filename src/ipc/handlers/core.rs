use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::platform::{HttpPlatform, LocalPlatform};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "connected": state.platform.is_some(),
            "loggedIn": state.session.is_some(),
            "user": state.session.as_ref().map(|s| s.username.clone()),
            "draftOpen": state.draft.is_some(),
        }),
    )
}

fn reset_for_new_backend(state: &mut AppState) {
    // A new backend invalidates whatever was in flight against the old one.
    state.session = None;
    state.draft = None;
}

fn handle_platform_connect(state: &mut AppState, req: &Request) -> serde_json::Value {
    let base_url = match required_str(req, "baseUrl") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match HttpPlatform::new(&base_url) {
        Ok(platform) => {
            reset_for_new_backend(state);
            state.platform = Some(Box::new(platform));
            tracing::info!(base_url = %base_url, "connected to platform");
            ok(&req.id, json!({ "baseUrl": base_url }))
        }
        Err(e) => err(&req.id, "connect_failed", format!("{e:?}"), None),
    }
}

fn handle_platform_connect_local(state: &mut AppState, req: &Request) -> serde_json::Value {
    reset_for_new_backend(state);
    state.platform = Some(Box::new(LocalPlatform::new()));
    tracing::info!("using local in-memory platform");
    ok(&req.id, json!({ "local": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "platform.connect" => Some(handle_platform_connect(state, req)),
        "platform.connectLocal" => Some(handle_platform_connect_local(state, req)),
        _ => None,
    }
}
