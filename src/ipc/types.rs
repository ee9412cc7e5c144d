use serde::Deserialize;

use crate::draft::WeeklyDraft;
use crate::platform::{Platform, Session};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon holds between requests: the selected platform
/// backend, the login session, and at most one authoring draft.
#[derive(Default)]
pub struct AppState {
    pub platform: Option<Box<dyn Platform>>,
    pub session: Option<Session>,
    pub draft: Option<DraftSession>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStatus {
    Editing,
    Submitting,
}

impl DraftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftStatus::Editing => "editing",
            DraftStatus::Submitting => "submitting",
        }
    }
}

/// One authoring session: the draft plus the submitting guard and the single
/// user-visible error message (each attempt replaces the previous one).
pub struct DraftSession {
    pub draft: WeeklyDraft,
    pub status: DraftStatus,
    pub error: Option<String>,
}

impl DraftSession {
    pub fn new() -> DraftSession {
        DraftSession {
            draft: WeeklyDraft::new(),
            status: DraftStatus::Editing,
            error: None,
        }
    }
}
