use crate::bulk::{BulkError, OperationKind};
use crate::calc::CalcContext;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_str, required_typed};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn bulk_err(req: &Request, e: BulkError) -> serde_json::Value {
    let details = match &e {
        BulkError::UnknownStudents(ids) => Some(json!({ "studentIds": ids })),
        BulkError::Busy(kind) => Some(json!({ "runningKind": kind })),
        BulkError::EmptySelection => None,
    };
    err(&req.id, e.code(), e.to_string(), details)
}

fn handle_bulk_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind_raw = match required_str(req, "kind") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(kind) = OperationKind::parse(&kind_raw) else {
        return err(
            &req.id,
            "bad_params",
            "kind must be one of: print, download",
            Some(json!({ "kind": kind_raw })),
        );
    };
    let student_ids: Vec<String> = match required_typed(req, "studentIds") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let ctx = CalcContext::from_state(&state.exam);
    match state.bulk.start(&ctx, kind, &student_ids) {
        Ok(ticket) => ok(&req.id, json!(ticket)),
        Err(e) => bulk_err(req, e),
    }
}

fn handle_bulk_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.bulk.status()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "bulk.start" => Some(handle_bulk_start(state, req)),
        "bulk.status" => Some(handle_bulk_status(state, req)),
        _ => None,
    }
}
