use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_START: &str = "08:00";
pub const DEFAULT_END: &str = "09:00";

/// Authoring weekdays. Read paths from the platform may also carry Sunday (0)
/// and Saturday (6); the draft never writes those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn wire_day(self) -> u8 {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
        }
    }

    pub fn from_wire(v: i64) -> Option<Weekday> {
        match v {
            1 => Some(Weekday::Monday),
            2 => Some(Weekday::Tuesday),
            3 => Some(Weekday::Wednesday),
            4 => Some(Weekday::Thursday),
            5 => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn from_name(s: &str) -> Option<Weekday> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }

    fn index(self) -> usize {
        self.wire_day() as usize - 1
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("subject, staff and both times are required")]
    MissingField,
    #[error("start time must be before end time")]
    InvalidTimeRange,
}

/// One taught period. Fields may be empty while the user is still editing;
/// `validate` decides whether the slot can be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub start: String,
    pub end: String,
    pub subject_id: String,
    pub staff_id: String,
    pub room: String,
}

impl Slot {
    /// Placeholder defaults shown when the user adds a period. The id is
    /// unique across the whole draft because the UI also uses it as a render
    /// key.
    pub fn placeholder() -> Slot {
        Slot {
            id: Uuid::new_v4().to_string(),
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
            subject_id: String::new(),
            staff_id: String::new(),
            room: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), SlotError> {
        if self.subject_id.trim().is_empty()
            || self.staff_id.trim().is_empty()
            || self.start.is_empty()
            || self.end.is_empty()
        {
            return Err(SlotError::MissingField);
        }
        // NaiveTime ordering matches the fixed-width HH:mm string ordering the
        // dashboard relies on, and rejects values a time picker never emits.
        let (Some(start), Some(end)) = (parse_hhmm(&self.start), parse_hhmm(&self.end)) else {
            return Err(SlotError::InvalidTimeRange);
        };
        if start >= end {
            return Err(SlotError::InvalidTimeRange);
        }
        Ok(())
    }
}

pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    StartTime,
    EndTime,
    Subject,
    Staff,
    Room,
}

impl SlotField {
    pub fn from_name(s: &str) -> Option<SlotField> {
        match s {
            "startTime" => Some(SlotField::StartTime),
            "endTime" => Some(SlotField::EndTime),
            "subjectId" => Some(SlotField::Subject),
            "staffId" => Some(SlotField::Staff),
            "room" => Some(SlotField::Room),
            _ => None,
        }
    }
}

/// Slots for one weekday, in insertion order (not time order). All operations
/// are copy-on-write: they return a new value and never touch the receiver,
/// so the builder can swap day values wholesale and change detection stays
/// reference-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    pub slots: Vec<Slot>,
}

impl DaySchedule {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a placeholder slot; returns the new day and the generated id.
    pub fn with_new_slot(&self) -> (DaySchedule, String) {
        let slot = Slot::placeholder();
        let id = slot.id.clone();
        let mut next = self.clone();
        next.slots.push(slot);
        (next, id)
    }

    /// Removes the slot with the given id. Unknown ids are a no-op, so
    /// deletion is idempotent.
    pub fn without_slot(&self, slot_id: &str) -> DaySchedule {
        let mut next = self.clone();
        next.slots.retain(|s| s.id != slot_id);
        next
    }

    /// Replaces exactly one field on exactly one slot. Unknown ids leave the
    /// result value-equal to the input.
    pub fn with_field(&self, slot_id: &str, field: SlotField, value: &str) -> DaySchedule {
        let mut next = self.clone();
        if let Some(slot) = next.slots.iter_mut().find(|s| s.id == slot_id) {
            match field {
                SlotField::StartTime => slot.start = value.to_string(),
                SlotField::EndTime => slot.end = value.to_string(),
                SlotField::Subject => slot.subject_id = value.to_string(),
                SlotField::Staff => slot.staff_id = value.to_string(),
                SlotField::Room => slot.room = value.to_string(),
            }
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("select a class before saving")]
    MissingClass,
    #[error("select a timetable type before saving")]
    MissingType,
    #[error("add at least one period before saving")]
    EmptyWeek,
    #[error("{day} has a period with missing details")]
    IncompleteSlot { day: Weekday },
    #[error("{day} has a period whose start time is not before its end time")]
    BadTimeOrder { day: Weekday },
}

/// The complete in-progress weekly timetable: class/type selection plus five
/// day schedules, Monday through Friday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyDraft {
    pub class_id: String,
    pub timetable_type_id: String,
    days: [DaySchedule; 5],
}

impl WeeklyDraft {
    pub fn new() -> WeeklyDraft {
        WeeklyDraft::default()
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn set_day(&mut self, day: Weekday, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    /// Appends a placeholder slot to the given day; returns the slot id.
    pub fn add_slot(&mut self, day: Weekday) -> String {
        let (next, id) = self.day(day).with_new_slot();
        self.set_day(day, next);
        id
    }

    pub fn remove_slot(&mut self, day: Weekday, slot_id: &str) {
        let next = self.day(day).without_slot(slot_id);
        self.set_day(day, next);
    }

    pub fn update_slot(&mut self, day: Weekday, slot_id: &str, field: SlotField, value: &str) {
        let next = self.day(day).with_field(slot_id, field, value);
        self.set_day(day, next);
    }

    /// Whole-draft validation, run once per submission attempt. Days are
    /// walked Monday first and slots in list order, and the first offence
    /// wins, so the reported day is stable for a given draft.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.class_id.trim().is_empty() {
            return Err(DraftError::MissingClass);
        }
        if self.timetable_type_id.trim().is_empty() {
            return Err(DraftError::MissingType);
        }
        if self.days.iter().all(|d| d.is_empty()) {
            return Err(DraftError::EmptyWeek);
        }
        for day in Weekday::ALL {
            for slot in &self.day(day).slots {
                match slot.validate() {
                    Ok(()) => {}
                    Err(SlotError::MissingField) => {
                        return Err(DraftError::IncompleteSlot { day });
                    }
                    Err(SlotError::InvalidTimeRange) => {
                        return Err(DraftError::BadTimeOrder { day });
                    }
                }
            }
        }
        Ok(())
    }
}
