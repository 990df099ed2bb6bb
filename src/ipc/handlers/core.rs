use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "term": state.exam.term(),
            "academicYear": state.exam.academic_year(),
            "revision": state.exam.revision(),
            "printDelayMs": state.config.print_delay.as_millis() as u64,
            "downloadDelayMs": state.config.download_delay.as_millis() as u64,
        }),
    )
}

fn handle_term_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "term": state.exam.term(),
            "academicYear": state.exam.academic_year(),
        }),
    )
}

fn handle_term_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let term = match required_str(req, "term") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Stored exactly as sent; only a blank label is refused.
    if term.trim().is_empty() {
        return err(&req.id, "bad_params", "term must not be empty", None);
    }

    // Results are not re-scoped to the new term.
    let revision = state.exam.set_term(term);
    tracing::info!(term = state.exam.term(), revision, "term changed");
    ok(
        &req.id,
        json!({
            "term": state.exam.term(),
            "revision": revision,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "term.get" => Some(handle_term_get(state, req)),
        "term.set" => Some(handle_term_set(state, req)),
        _ => None,
    }
}
