use crate::calc::{self, CalcContext};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::render;
use serde_json::json;

fn handle_reports_term(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let ctx = CalcContext::from_state(&state.exam);
    // Unknown students are a normal answer, not an error.
    let report = calc::term_report(&ctx, &student_id);
    ok(
        &req.id,
        json!({
            "found": report.is_some(),
            "report": report,
        }),
    )
}

fn handle_reports_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let ctx = CalcContext::from_state(&state.exam);
    let Some(report) = calc::term_report(&ctx, &student_id) else {
        return err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        );
    };
    ok(
        &req.id,
        json!({
            "studentId": student_id,
            "hasData": report.has_data,
            "text": render::report_card_text(&report),
        }),
    )
}

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let summary = calc::dashboard_summary(&CalcContext::from_state(&state.exam));
    ok(&req.id, json!(summary))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.term" => Some(handle_reports_term(state, req)),
        "reports.preview" => Some(handle_reports_preview(state, req)),
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}
