use serde_json::{json, Value};

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{platform_failure, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_by_class(state: &mut AppState, req: &Request) -> Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(platform) = state.platform.as_mut() else {
        return err(&req.id, "not_connected", "connect to the platform first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "log in first", None);
    };

    let fetched = platform.timetable_by_class(session, &class_id);
    match fetched {
        Ok(Some(view)) => ok(&req.id, json!({ "timetable": view })),
        Ok(None) => err(&req.id, "not_found", "no timetable for that class", None),
        Err(e) => platform_failure(state, req, e),
    }
}

fn handle_list_grouped(state: &mut AppState, req: &Request) -> Value {
    let Some(platform) = state.platform.as_mut() else {
        return err(&req.id, "not_connected", "connect to the platform first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "log in first", None);
    };

    let fetched = platform.timetables_grouped(session);
    match fetched {
        Ok(views) => ok(&req.id, json!({ "timetables": views })),
        Err(e) => platform_failure(state, req, e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(platform) = state.platform.as_mut() else {
        return err(&req.id, "not_connected", "connect to the platform first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "log in first", None);
    };

    // Delete then refetch: the reply always carries the reconciled list, and
    // deleting a class that has no timetable is not an error.
    let refreshed = match platform.delete_timetable(session, &class_id) {
        Ok(()) => {
            tracing::info!(class = %class_id, "timetable deleted");
            platform.timetables_grouped(session)
        }
        Err(e) => Err(e),
    };
    match refreshed {
        Ok(views) => ok(&req.id, json!({ "timetables": views })),
        Err(e) => platform_failure(state, req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "timetable.byClass" => Some(handle_by_class(state, req)),
        "timetable.listGrouped" => Some(handle_list_grouped(state, req)),
        "timetable.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
