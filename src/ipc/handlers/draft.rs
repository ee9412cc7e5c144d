use serde_json::{json, Value};

use crate::draft::Weekday;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, required_day, required_field, required_str};
use crate::ipc::types::{AppState, DraftSession, DraftStatus, Request};
use crate::platform::PlatformError;
use crate::wire;

const SUBMIT_FALLBACK: &str = "could not save the timetable; please try again";

fn draft_snapshot(session: &DraftSession) -> Value {
    json!({
        "classId": session.draft.class_id,
        "timeTableTypeId": session.draft.timetable_type_id,
        "status": session.status.as_str(),
        "error": session.error,
        "days": Weekday::ALL
            .iter()
            .map(|&day| json!({
                "day": day.wire_day(),
                "label": day.label(),
                "slots": session.draft.day(day).slots,
            }))
            .collect::<Vec<_>>(),
    })
}

fn handle_draft_start(state: &mut AppState, req: &Request) -> Value {
    // Mounting the authoring screen always starts clean; any previous draft
    // is discarded, never resumed.
    let session = DraftSession::new();
    let snapshot = draft_snapshot(&session);
    state.draft = Some(session);
    ok(&req.id, snapshot)
}

fn handle_draft_select(state: &mut AppState, req: &Request) -> Value {
    let Some(session) = state.draft.as_mut() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };
    if let Some(class_id) = optional_str(req, "classId") {
        session.draft.class_id = class_id;
    }
    if let Some(type_id) = optional_str(req, "timeTableTypeId") {
        session.draft.timetable_type_id = type_id;
    }
    ok(&req.id, draft_snapshot(session))
}

fn handle_draft_add_slot(state: &mut AppState, req: &Request) -> Value {
    let day = match required_day(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(session) = state.draft.as_mut() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };

    let slot_id = session.draft.add_slot(day);
    ok(
        &req.id,
        json!({
            "day": day.wire_day(),
            "slotId": slot_id,
            "slots": session.draft.day(day).slots,
        }),
    )
}

fn handle_draft_remove_slot(state: &mut AppState, req: &Request) -> Value {
    let day = match required_day(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let slot_id = match required_str(req, "slotId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(session) = state.draft.as_mut() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };

    // Removing an id that is already gone is fine; the UI may race itself.
    session.draft.remove_slot(day, &slot_id);
    ok(
        &req.id,
        json!({
            "day": day.wire_day(),
            "slots": session.draft.day(day).slots,
        }),
    )
}

fn handle_draft_update_slot(state: &mut AppState, req: &Request) -> Value {
    let day = match required_day(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let slot_id = match required_str(req, "slotId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field = match required_field(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // The value may be empty: clearing a room (or a half-typed time) is a
    // legitimate edit and only submission cares about completeness.
    let Some(value) = req.params.get("value").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing value", None);
    };
    let Some(session) = state.draft.as_mut() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };

    session.draft.update_slot(day, &slot_id, field, value);
    ok(
        &req.id,
        json!({
            "day": day.wire_day(),
            "slots": session.draft.day(day).slots,
        }),
    )
}

fn handle_draft_get(state: &mut AppState, req: &Request) -> Value {
    let Some(session) = state.draft.as_ref() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };
    ok(&req.id, draft_snapshot(session))
}

fn handle_draft_discard(state: &mut AppState, req: &Request) -> Value {
    state.draft = None;
    ok(&req.id, json!({ "ok": true }))
}

fn handle_draft_submit(state: &mut AppState, req: &Request) -> Value {
    let Some(platform) = state.platform.as_mut() else {
        return err(&req.id, "not_connected", "connect to the platform first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "log in first", None);
    };
    let Some(draft_session) = state.draft.as_mut() else {
        return err(&req.id, "no_draft", "start a draft first", None);
    };
    if draft_session.status == DraftStatus::Submitting {
        return err(
            &req.id,
            "submit_in_progress",
            "a submission is already pending",
            None,
        );
    }

    // Local validation settles the whole attempt; the platform is never
    // called for an invalid draft.
    if let Err(e) = draft_session.draft.validate() {
        let message = e.to_string();
        draft_session.error = Some(message.clone());
        return err(&req.id, "invalid_draft", message, None);
    }

    let payload = wire::to_wire_payload(&draft_session.draft);
    draft_session.status = DraftStatus::Submitting;
    draft_session.error = None;

    let outcome = platform.create_timetable(session, &payload);
    match outcome {
        Ok(()) => {
            tracing::info!(class = %payload.class_id, "timetable submitted");
            // Success ends the authoring session and clears all error state.
            state.draft = None;
            ok(&req.id, json!({ "classId": payload.class_id }))
        }
        Err(PlatformError::Unauthorized) => {
            tracing::warn!("submission rejected: session no longer valid");
            state.session = None;
            // The draft survives so no work is lost across a re-login.
            if let Some(draft_session) = state.draft.as_mut() {
                draft_session.status = DraftStatus::Editing;
                draft_session.error =
                    Some("session is no longer valid; log in again".to_string());
            }
            err(
                &req.id,
                "unauthorized",
                "session is no longer valid; log in again",
                None,
            )
        }
        Err(e) => {
            let message = match e {
                PlatformError::Api { message } => message,
                e => {
                    tracing::warn!(error = %e, "submission transport failure");
                    SUBMIT_FALLBACK.to_string()
                }
            };
            if let Some(draft_session) = state.draft.as_mut() {
                draft_session.status = DraftStatus::Editing;
                draft_session.error = Some(message.clone());
            }
            err(&req.id, "submit_failed", message, None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "timetable.draftStart" => Some(handle_draft_start(state, req)),
        "timetable.draftSelect" => Some(handle_draft_select(state, req)),
        "timetable.draftAddSlot" => Some(handle_draft_add_slot(state, req)),
        "timetable.draftRemoveSlot" => Some(handle_draft_remove_slot(state, req)),
        "timetable.draftUpdateSlot" => Some(handle_draft_update_slot(state, req)),
        "timetable.draftGet" => Some(handle_draft_get(state, req)),
        "timetable.draftDiscard" => Some(handle_draft_discard(state, req)),
        "timetable.draftSubmit" => Some(handle_draft_submit(state, req)),
        _ => None,
    }
}
