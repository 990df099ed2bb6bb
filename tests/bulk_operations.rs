use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar(delay_ms: u64) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_examd");
    let delay = delay_ms.to_string();
    let mut child = Command::new(exe)
        .env("EXAMD_PRINT_DELAY_MS", &delay)
        .env("EXAMD_DOWNLOAD_DELAY_MS", &delay)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn examd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_value(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read line");
    assert!(!line.trim().is_empty(), "empty line from sidecar");
    serde_json::from_str(line.trim()).expect("parse json line")
}

fn send(stdin: &mut ChildStdin, id: &str, method: &str, params: serde_json::Value) {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
}

/// Reads lines until the response for `id`, stashing events on the way.
fn response(
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    events: &mut Vec<serde_json::Value>,
) -> serde_json::Value {
    loop {
        let v = read_value(reader);
        if v.get("event").is_some() {
            events.push(v);
            continue;
        }
        assert_eq!(v.get("id").and_then(|v| v.as_str()), Some(id));
        return v;
    }
}

/// Reads until a `bulk.completed` event, returning all events seen.
fn until_completed(
    reader: &mut BufReader<ChildStdout>,
    mut events: Vec<serde_json::Value>,
) -> Vec<serde_json::Value> {
    while !events.iter().any(|e| e["event"] == json!("bulk.completed")) {
        let v = read_value(reader);
        assert!(v.get("event").is_some(), "unexpected response: {}", v);
        events.push(v);
    }
    events
}

#[test]
fn bulk_print_processes_selection_in_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(0);
    let mut events = Vec::new();

    send(
        &mut stdin,
        "1",
        "bulk.start",
        json!({ "kind": "print", "studentIds": ["S005", "S001", "S003"] }),
    );
    let started = response(&mut reader, "1", &mut events);
    assert_eq!(started["ok"], json!(true), "{}", started);
    assert_eq!(started["result"]["kind"], json!("print"));
    assert_eq!(started["result"]["total"], json!(3));
    let run_id = started["result"]["runId"].clone();

    let events = until_completed(&mut reader, events);
    let progress: Vec<&serde_json::Value> = events
        .iter()
        .filter(|e| e["event"] == json!("bulk.progress"))
        .collect();
    assert_eq!(progress.len(), 3);
    for (i, e) in progress.iter().enumerate() {
        assert_eq!(e["data"]["runId"], run_id);
        assert_eq!(e["data"]["progress"]["current"], json!(i + 1));
        assert_eq!(e["data"]["progress"]["total"], json!(3));
        assert_eq!(e["data"]["entry"]["kind"], json!("print"));
        assert_eq!(e["data"]["entry"]["success"], json!(true));
    }
    let order: Vec<&str> = progress
        .iter()
        .filter_map(|e| e["data"]["entry"]["studentId"].as_str())
        .collect();
    assert_eq!(order, vec!["S005", "S001", "S003"]);

    let completed = events
        .iter()
        .find(|e| e["event"] == json!("bulk.completed"))
        .expect("completed event");
    let names: Vec<&str> = completed["data"]["log"]
        .as_array()
        .expect("log")
        .iter()
        .filter_map(|e| e["student"].as_str())
        .collect();
    assert_eq!(names, vec!["David Wilson", "John Smith", "Michael Brown"]);

    let mut more = Vec::new();
    send(&mut stdin, "2", "bulk.status", json!({}));
    let status = response(&mut reader, "2", &mut more);
    let status = &status["result"];
    assert_eq!(status["running"], json!(false));
    assert_eq!(status["runId"], run_id);
    assert_eq!(status["progress"], json!({ "current": 0, "total": 0 }));
    assert_eq!(status["log"].as_array().map(|a| a.len()), Some(3));
    assert!(status["log"][0]["timestamp"].is_string());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bulk_download_records_rendered_cards() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(0);
    let mut events = Vec::new();

    send(
        &mut stdin,
        "1",
        "bulk.start",
        json!({ "kind": "download", "studentIds": ["S002", "S002", "S004"] }),
    );
    let started = response(&mut reader, "1", &mut events);
    assert_eq!(started["result"]["total"], json!(2));

    let events = until_completed(&mut reader, events);
    let entries: Vec<&serde_json::Value> = events
        .iter()
        .filter(|e| e["event"] == json!("bulk.progress"))
        .map(|e| &e["data"]["entry"])
        .collect();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["kind"], json!("download"));
        assert!(entry["artifact"]["bytes"].as_u64().unwrap_or(0) > 0);
        assert_eq!(entry["artifact"]["sha256"].as_str().map(|s| s.len()), Some(64));
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn second_run_while_busy_is_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(300);
    let mut events = Vec::new();

    send(
        &mut stdin,
        "1",
        "bulk.start",
        json!({ "kind": "print", "studentIds": ["S001", "S002"] }),
    );
    let started = response(&mut reader, "1", &mut events);
    assert_eq!(started["ok"], json!(true));

    send(
        &mut stdin,
        "2",
        "bulk.start",
        json!({ "kind": "download", "studentIds": ["S003"] }),
    );
    let busy = response(&mut reader, "2", &mut events);
    assert_eq!(busy["ok"], json!(false));
    assert_eq!(busy["error"]["code"], json!("busy"));
    assert_eq!(busy["error"]["details"]["runningKind"], json!("print"));

    send(&mut stdin, "3", "bulk.status", json!({}));
    let status = response(&mut reader, "3", &mut events);
    assert_eq!(status["result"]["running"], json!(true));
    assert_eq!(status["result"]["kind"], json!("print"));
    assert_eq!(status["result"]["progress"]["total"], json!(2));

    let events = until_completed(&mut reader, events);
    let completed = events
        .iter()
        .find(|e| e["event"] == json!("bulk.completed"))
        .expect("completed event");
    assert_eq!(completed["data"]["log"].as_array().map(|a| a.len()), Some(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_selections_are_rejected_up_front() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(0);
    let mut events = Vec::new();

    send(
        &mut stdin,
        "1",
        "bulk.start",
        json!({ "kind": "print", "studentIds": [] }),
    );
    let resp = response(&mut reader, "1", &mut events);
    assert_eq!(resp["error"]["code"], json!("empty_selection"));

    send(
        &mut stdin,
        "2",
        "bulk.start",
        json!({ "kind": "print", "studentIds": ["S001", "S404"] }),
    );
    let resp = response(&mut reader, "2", &mut events);
    assert_eq!(resp["error"]["code"], json!("not_found"));
    assert_eq!(resp["error"]["details"]["studentIds"], json!(["S404"]));

    send(
        &mut stdin,
        "3",
        "bulk.start",
        json!({ "kind": "fax", "studentIds": ["S001"] }),
    );
    let resp = response(&mut reader, "3", &mut events);
    assert_eq!(resp["error"]["code"], json!("bad_params"));

    send(&mut stdin, "4", "bulk.status", json!({}));
    let status = response(&mut reader, "4", &mut events);
    assert_eq!(status["result"]["running"], json!(false));
    assert!(status["result"]["runId"].is_null());
    assert!(events.is_empty());

    drop(stdin);
    let _ = child.wait();
}
