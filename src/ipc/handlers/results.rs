use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, required_typed};
use crate::ipc::types::{AppState, Request};
use crate::model::ExamResult;
use serde_json::json;

fn handle_results_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match optional_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let rows: Vec<&ExamResult> = match student_id.as_deref() {
        Some(id) => state.exam.results_for(id).collect(),
        None => state.exam.results().iter().collect(),
    };
    ok(&req.id, json!({ "results": rows }))
}

fn handle_results_replace(state: &mut AppState, req: &Request) -> serde_json::Value {
    let results: Vec<ExamResult> = match required_typed(req, "results") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let count = results.len();
    let revision = state.exam.replace_results(results);
    tracing::info!(count, revision, "exam results replaced");
    ok(
        &req.id,
        json!({
            "count": count,
            "revision": revision,
        }),
    )
}

fn handle_grades_classify(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(marks) = req.params.get("marks").and_then(|v| v.as_f64()) else {
        return err(&req.id, "bad_params", "marks must be a number", None);
    };
    ok(
        &req.id,
        json!({
            "marks": marks,
            "grade": calc::grade_letter(marks),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "results.list" => Some(handle_results_list(state, req)),
        "results.replace" => Some(handle_results_replace(state, req)),
        "grades.classify" => Some(handle_grades_classify(state, req)),
        _ => None,
    }
}
