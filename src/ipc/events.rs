use serde_json::json;

use crate::bulk::BulkEvent;
use crate::state::StateChange;

fn event(name: &str, data: serde_json::Value) -> serde_json::Value {
    json!({
        "event": name,
        "data": data,
    })
}

pub fn state_changed(change: &StateChange) -> serde_json::Value {
    event("state.changed", json!(change))
}

pub fn bulk_event(ev: &BulkEvent) -> serde_json::Value {
    match ev {
        BulkEvent::Progress {
            run_id,
            kind,
            progress,
            entry,
        } => event(
            "bulk.progress",
            json!({
                "runId": run_id,
                "kind": kind,
                "progress": progress,
                "entry": entry,
            }),
        ),
        BulkEvent::Completed { run_id, kind, log } => event(
            "bulk.completed",
            json!({
                "runId": run_id,
                "kind": kind,
                "log": log,
            }),
        ),
    }
}
