use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

struct Harness {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    next_id: u32,
}

impl Harness {
    fn start() -> Harness {
        let (child, stdin, reader) = spawn_sidecar();
        let mut h = Harness {
            child,
            stdin,
            reader,
            next_id: 0,
        };
        h.call("platform.connectLocal", json!({}));
        h.call("auth.login", json!({ "username": "admin", "password": "pw" }));
        h.call("timetable.draftStart", json!({}));
        h
    }

    fn call(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        request(
            &mut self.stdin,
            &mut self.reader,
            &self.next_id.to_string(),
            method,
            params,
        )
    }

    fn submit_error(&mut self) -> String {
        let resp = self.call("timetable.draftSubmit", json!({}));
        assert_eq!(resp["ok"], false, "expected submit to fail: {}", resp);
        assert_eq!(resp["error"]["code"], "invalid_draft");
        resp["error"]["message"].as_str().expect("message").to_string()
    }

    fn add_complete_slot(&mut self, day: u8, start: &str, end: &str) -> String {
        let added = self.call("timetable.draftAddSlot", json!({ "day": day }));
        let slot_id = added["result"]["slotId"].as_str().expect("slotId").to_string();
        for (field, value) in [
            ("startTime", start),
            ("endTime", end),
            ("subjectId", "s1"),
            ("staffId", "st1"),
        ] {
            self.call(
                "timetable.draftUpdateSlot",
                json!({ "day": day, "slotId": slot_id, "field": field, "value": value }),
            );
        }
        slot_id
    }

    fn finish(mut self) {
        drop(self.stdin);
        let _ = self.child.wait();
    }
}

#[test]
fn submission_walks_the_error_taxonomy_in_order() {
    let mut h = Harness::start();

    // No class selected yet.
    let msg = h.submit_error();
    assert!(msg.contains("class"), "unexpected message: {}", msg);

    h.call("timetable.draftSelect", json!({ "classId": "c1" }));
    let msg = h.submit_error();
    assert!(msg.contains("type"), "unexpected message: {}", msg);

    h.call("timetable.draftSelect", json!({ "timeTableTypeId": "t1" }));
    let msg = h.submit_error();
    assert!(msg.contains("at least one period"), "unexpected message: {}", msg);

    // A freshly added slot has no subject or staff yet.
    let slot_id = {
        let added = h.call("timetable.draftAddSlot", json!({ "day": 1 }));
        added["result"]["slotId"].as_str().expect("slotId").to_string()
    };
    let msg = h.submit_error();
    assert!(msg.starts_with("Monday"), "unexpected message: {}", msg);
    assert!(msg.contains("missing"), "unexpected message: {}", msg);

    for (field, value) in [("subjectId", "s1"), ("staffId", "st1")] {
        h.call(
            "timetable.draftUpdateSlot",
            json!({ "day": 1, "slotId": slot_id, "field": field, "value": value }),
        );
    }
    h.call(
        "timetable.draftUpdateSlot",
        json!({ "day": 1, "slotId": slot_id, "field": "endTime", "value": "07:00" }),
    );
    let msg = h.submit_error();
    assert!(msg.starts_with("Monday"), "unexpected message: {}", msg);
    assert!(msg.contains("start time"), "unexpected message: {}", msg);

    // The latest attempt's message is the one the draft carries.
    let snapshot = h.call("timetable.draftGet", json!({}));
    assert_eq!(snapshot["result"]["error"], msg.as_str());
    assert_eq!(snapshot["result"]["status"], "editing");

    h.finish();
}

#[test]
fn earliest_weekday_offence_is_reported() {
    let mut h = Harness::start();
    h.call(
        "timetable.draftSelect",
        json!({ "classId": "c1", "timeTableTypeId": "t1" }),
    );

    // Thursday gets an incomplete slot, Tuesday an inverted one. Tuesday is
    // the earlier weekday, so Tuesday must be reported.
    h.call("timetable.draftAddSlot", json!({ "day": 4 }));
    h.add_complete_slot(2, "10:00", "09:00");

    let msg = h.submit_error();
    assert!(msg.starts_with("Tuesday"), "unexpected message: {}", msg);

    h.finish();
}

#[test]
fn failed_validation_never_reaches_the_platform() {
    let mut h = Harness::start();
    h.call(
        "timetable.draftSelect",
        json!({ "classId": "c1", "timeTableTypeId": "t1" }),
    );
    h.call("timetable.draftAddSlot", json!({ "day": 1 }));
    let _ = h.submit_error();

    // Nothing was created remotely and the draft is still open for fixes.
    let fetched = h.call("timetable.byClass", json!({ "classId": "c1" }));
    assert_eq!(fetched["error"]["code"], "not_found");
    let snapshot = h.call("timetable.draftGet", json!({}));
    assert_eq!(snapshot["ok"], true);

    h.finish();
}

#[test]
fn a_valid_draft_submits_after_corrections() {
    let mut h = Harness::start();
    h.call(
        "timetable.draftSelect",
        json!({ "classId": "c1", "timeTableTypeId": "t1" }),
    );
    let slot_id = h.add_complete_slot(1, "08:00", "07:00");
    let _ = h.submit_error();

    h.call(
        "timetable.draftUpdateSlot",
        json!({ "day": 1, "slotId": slot_id, "field": "endTime", "value": "09:00" }),
    );
    let resp = h.call("timetable.draftSubmit", json!({}));
    assert_eq!(resp["ok"], true, "resubmit failed: {}", resp);
    assert_eq!(resp["result"]["classId"], "c1");

    h.finish();
}
