use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::wire::{CreateTimetablePayload, DailyView, SlotView, TimetableView};

/// Credentials yield a session; the session is passed to every platform call
/// rather than living in ambient state, so callers stay testable and a stale
/// token is detectable per call.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not authorized")]
    Unauthorized,
    #[error("{message}")]
    Api { message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// The remote school-platform persistence API, reduced to the operations the
/// dashboard needs. Backends are swappable so the daemon can run against the
/// real service or a local in-memory stand-in.
pub trait Platform {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, PlatformError>;

    /// Stores a full replacement timetable for the payload's class.
    fn create_timetable(
        &mut self,
        session: &Session,
        payload: &CreateTimetablePayload,
    ) -> Result<(), PlatformError>;

    fn timetable_by_class(
        &mut self,
        session: &Session,
        class_id: &str,
    ) -> Result<Option<TimetableView>, PlatformError>;

    fn timetables_grouped(&mut self, session: &Session)
        -> Result<Vec<TimetableView>, PlatformError>;

    /// Idempotent: deleting a class with no timetable is success.
    fn delete_timetable(&mut self, session: &Session, class_id: &str)
        -> Result<(), PlatformError>;
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
}

/// JSON-over-HTTP backend against the real platform.
pub struct HttpPlatform {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpPlatform {
    pub fn new(base_url: &str) -> anyhow::Result<HttpPlatform> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HttpPlatform {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Converts a non-success response into the platform taxonomy, carrying the
/// service's own message through when it sends one.
fn api_error(resp: reqwest::blocking::Response) -> PlatformError {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return PlatformError::Unauthorized;
    }
    let message = resp
        .json::<ApiMessage>()
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| format!("platform request failed ({status})"));
    PlatformError::Api { message }
}

impl Platform for HttpPlatform {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, PlatformError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()?;
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        let body: LoginResponse = resp.json()?;
        Ok(Session {
            token: body.token,
            username: username.to_string(),
            issued_at: Utc::now(),
        })
    }

    fn create_timetable(
        &mut self,
        session: &Session,
        payload: &CreateTimetablePayload,
    ) -> Result<(), PlatformError> {
        let resp = self
            .client
            .post(self.url("/api/timetables"))
            .bearer_auth(&session.token)
            .json(payload)
            .send()?;
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        Ok(())
    }

    fn timetable_by_class(
        &mut self,
        session: &Session,
        class_id: &str,
    ) -> Result<Option<TimetableView>, PlatformError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/timetables/class/{class_id}")))
            .bearer_auth(&session.token)
            .send()?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        Ok(Some(resp.json()?))
    }

    fn timetables_grouped(
        &mut self,
        session: &Session,
    ) -> Result<Vec<TimetableView>, PlatformError> {
        let resp = self
            .client
            .get(self.url("/api/timetables/grouped"))
            .bearer_auth(&session.token)
            .send()?;
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        Ok(resp.json()?)
    }

    fn delete_timetable(
        &mut self,
        session: &Session,
        class_id: &str,
    ) -> Result<(), PlatformError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/timetables/class/{class_id}")))
            .bearer_auth(&session.token)
            .send()?;
        // The UI treats "already gone" as done; it reconciles by refetching.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        Ok(())
    }
}

/// In-memory backend for development sandboxes and the integration tests.
/// Accepts any non-empty credentials and resolves display names from a small
/// seeded directory, falling back to the raw id.
pub struct LocalPlatform {
    directory: HashMap<String, String>,
    class_names: HashMap<String, String>,
    timetables: HashMap<String, TimetableView>,
    issued_tokens: HashSet<String>,
}

impl LocalPlatform {
    pub fn new() -> LocalPlatform {
        let directory = [
            ("SUBJ-MATH", "Mathematics"),
            ("SUBJ-ENG", "English"),
            ("SUBJ-SCI", "Science"),
            ("STAFF-0001", "A. Byrne"),
            ("STAFF-0002", "L. Okafor"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let class_names = [("CLASS-8B", "Year 8 Blue"), ("CLASS-9R", "Year 9 Red")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LocalPlatform {
            directory,
            class_names,
            timetables: HashMap::new(),
            issued_tokens: HashSet::new(),
        }
    }

    fn check(&self, session: &Session) -> Result<(), PlatformError> {
        if self.issued_tokens.contains(&session.token) {
            Ok(())
        } else {
            Err(PlatformError::Unauthorized)
        }
    }

    fn display_name(&self, id: &str) -> String {
        self.directory
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn class_name(&self, id: &str) -> String {
        self.class_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl Default for LocalPlatform {
    fn default() -> Self {
        LocalPlatform::new()
    }
}

impl Platform for LocalPlatform {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, PlatformError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(PlatformError::Unauthorized);
        }
        let token = Uuid::new_v4().to_string();
        self.issued_tokens.insert(token.clone());
        Ok(Session {
            token,
            username: username.to_string(),
            issued_at: Utc::now(),
        })
    }

    fn create_timetable(
        &mut self,
        session: &Session,
        payload: &CreateTimetablePayload,
    ) -> Result<(), PlatformError> {
        self.check(session)?;
        let view = TimetableView {
            class_id: payload.class_id.clone(),
            class_name: self.class_name(&payload.class_id),
            daily_timetables: payload
                .daily_timetables
                .iter()
                .map(|entry| DailyView {
                    day: entry.day,
                    slots: entry
                        .slots
                        .iter()
                        .map(|slot| SlotView {
                            start_time: slot.start_time.clone(),
                            end_time: slot.end_time.clone(),
                            subject_id: slot.subject_id.clone(),
                            subject_name: self.display_name(&slot.subject_id),
                            staff_id: slot.staff_id.clone(),
                            staff_name: self.display_name(&slot.staff_id),
                            room: slot.room.clone(),
                        })
                        .collect(),
                })
                .collect(),
        };
        // Full replacement per class; there is no partial update.
        self.timetables.insert(payload.class_id.clone(), view);
        Ok(())
    }

    fn timetable_by_class(
        &mut self,
        session: &Session,
        class_id: &str,
    ) -> Result<Option<TimetableView>, PlatformError> {
        self.check(session)?;
        Ok(self.timetables.get(class_id).cloned())
    }

    fn timetables_grouped(
        &mut self,
        session: &Session,
    ) -> Result<Vec<TimetableView>, PlatformError> {
        self.check(session)?;
        let mut views: Vec<TimetableView> = self.timetables.values().cloned().collect();
        views.sort_by(|a, b| a.class_id.cmp(&b.class_id));
        Ok(views)
    }

    fn delete_timetable(
        &mut self,
        session: &Session,
        class_id: &str,
    ) -> Result<(), PlatformError> {
        self.check(session)?;
        self.timetables.remove(class_id);
        Ok(())
    }
}
