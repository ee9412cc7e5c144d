use serde::{Deserialize, Serialize};

use crate::draft::{Weekday, WeeklyDraft};

/// One period as the platform expects it on create: second-precision times,
/// `room` absent (not empty) when the draft has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    pub start_time: String,
    pub end_time: String,
    pub subject_id: String,
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTimetableEntry {
    pub day: u8,
    pub slots: Vec<SlotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimetablePayload {
    pub class_id: String,
    pub time_table_type_id: String,
    pub daily_timetables: Vec<DailyTimetableEntry>,
}

/// Maps a validated draft onto the create payload. Pure: the caller decides
/// when (and whether) to hand the result to the platform.
pub fn to_wire_payload(draft: &WeeklyDraft) -> CreateTimetablePayload {
    let daily_timetables = Weekday::ALL
        .iter()
        .copied()
        // Days without periods are left out of the payload entirely.
        .filter(|day| !draft.day(*day).is_empty())
        .map(|day| DailyTimetableEntry {
            day: day.wire_day(),
            slots: draft
                .day(day)
                .slots
                .iter()
                .map(|slot| SlotEntry {
                    start_time: with_seconds(&slot.start),
                    end_time: with_seconds(&slot.end),
                    subject_id: slot.subject_id.clone(),
                    staff_id: slot.staff_id.clone(),
                    room: match slot.room.trim() {
                        "" => None,
                        r => Some(r.to_string()),
                    },
                })
                .collect(),
        })
        .collect();

    CreateTimetablePayload {
        class_id: draft.class_id.clone(),
        time_table_type_id: draft.timetable_type_id.clone(),
        daily_timetables,
    }
}

/// Draft times are minute precision; the wire format wants HH:mm:ss.
fn with_seconds(hhmm: &str) -> String {
    format!("{hhmm}:00")
}

/// A slot as the platform reports it back, with display names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub start_time: String,
    pub end_time: String,
    pub subject_id: String,
    pub subject_name: String,
    pub staff_id: String,
    pub staff_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Read paths span the full week: 0 (Sunday) through 6 (Saturday), even
/// though authoring only ever writes 1..5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyView {
    pub day: u8,
    #[serde(default)]
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableView {
    pub class_id: String,
    pub class_name: String,
    #[serde(default)]
    pub daily_timetables: Vec<DailyView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DaySchedule, SlotField, Weekday};

    fn tuesday_draft(room: &str) -> WeeklyDraft {
        let mut draft = WeeklyDraft::new();
        draft.class_id = "c1".to_string();
        draft.timetable_type_id = "t1".to_string();
        let (day, slot_id) = DaySchedule::default().with_new_slot();
        let day = day
            .with_field(&slot_id, SlotField::StartTime, "08:00")
            .with_field(&slot_id, SlotField::EndTime, "09:30")
            .with_field(&slot_id, SlotField::Subject, "s1")
            .with_field(&slot_id, SlotField::Staff, "st1")
            .with_field(&slot_id, SlotField::Room, room);
        draft.set_day(Weekday::Tuesday, day);
        draft
    }

    #[test]
    fn empty_days_are_omitted_and_seconds_appended() {
        let payload = to_wire_payload(&tuesday_draft(""));

        assert_eq!(payload.class_id, "c1");
        assert_eq!(payload.time_table_type_id, "t1");
        assert_eq!(payload.daily_timetables.len(), 1);

        let entry = &payload.daily_timetables[0];
        assert_eq!(entry.day, 2);
        assert_eq!(entry.slots.len(), 1);
        assert_eq!(entry.slots[0].start_time, "08:00:00");
        assert_eq!(entry.slots[0].end_time, "09:30:00");
        assert_eq!(entry.slots[0].subject_id, "s1");
        assert_eq!(entry.slots[0].staff_id, "st1");
        assert_eq!(entry.slots[0].room, None);
    }

    #[test]
    fn empty_room_has_no_key_on_the_wire() {
        let payload = to_wire_payload(&tuesday_draft(""));
        let value = serde_json::to_value(&payload).expect("serialize payload");

        let slot = &value["dailyTimetables"][0]["slots"][0];
        assert!(slot.get("room").is_none());
        assert_eq!(slot["startTime"], "08:00:00");
        assert_eq!(value["timeTableTypeId"], "t1");
    }

    #[test]
    fn named_room_is_carried_through() {
        let payload = to_wire_payload(&tuesday_draft("Lab 2"));
        assert_eq!(
            payload.daily_timetables[0].slots[0].room.as_deref(),
            Some("Lab 2")
        );
    }

    #[test]
    fn slots_keep_insertion_order_per_day() {
        let mut draft = tuesday_draft("");
        let first_extra = draft.add_slot(Weekday::Tuesday);
        draft.update_slot(Weekday::Tuesday, &first_extra, SlotField::Subject, "s2");
        draft.update_slot(Weekday::Tuesday, &first_extra, SlotField::Staff, "st2");
        // Earlier start time than the existing slot; order must not change.
        draft.update_slot(Weekday::Tuesday, &first_extra, SlotField::StartTime, "07:00");
        draft.update_slot(Weekday::Tuesday, &first_extra, SlotField::EndTime, "07:45");

        let payload = to_wire_payload(&draft);
        let slots = &payload.daily_timetables[0].slots;
        assert_eq!(slots[0].subject_id, "s1");
        assert_eq!(slots[1].subject_id, "s2");
        assert_eq!(slots[1].start_time, "07:00:00");
    }

    #[test]
    fn view_round_trips_with_optional_room() {
        let raw = serde_json::json!({
            "classId": "c1",
            "className": "Year 8 Blue",
            "dailyTimetables": [
                { "day": 0, "slots": [] },
                {
                    "day": 2,
                    "slots": [{
                        "startTime": "08:00:00",
                        "endTime": "09:30:00",
                        "subjectId": "s1",
                        "subjectName": "Mathematics",
                        "staffId": "st1",
                        "staffName": "J. Doe"
                    }]
                }
            ]
        });
        let view: TimetableView = serde_json::from_value(raw).expect("parse view");
        assert_eq!(view.class_name, "Year 8 Blue");
        assert_eq!(view.daily_timetables[0].day, 0);
        assert_eq!(view.daily_timetables[1].slots[0].room, None);
        assert_eq!(view.daily_timetables[1].slots[0].subject_name, "Mathematics");
    }

    #[test]
    fn slot_entry_missing_room_parses_as_none() {
        let raw = serde_json::json!({
            "startTime": "08:00:00",
            "endTime": "09:00:00",
            "subjectId": "s1",
            "staffId": "st1"
        });
        let entry: SlotEntry = serde_json::from_value(raw).expect("parse entry");
        assert_eq!(entry.room, None);
    }
}
