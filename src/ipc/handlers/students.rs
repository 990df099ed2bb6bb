use crate::calc;
use crate::filters::{distinct_grades, distinct_sections, RosterFilter};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, required_typed};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filter = match RosterFilter::from_params(&req.params) {
        Ok(f) => f,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let results = state.exam.results();
    let rows: Vec<calc::RosterRow> = filter
        .apply(state.exam.students())
        .into_iter()
        .map(|s| calc::roster_row(results, s))
        .collect();

    ok(
        &req.id,
        json!({
            "filters": filter,
            "students": rows,
        }),
    )
}

fn handle_students_filters(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "grades": distinct_grades(state.exam.students()),
            "sections": distinct_sections(state.exam.students()),
        }),
    )
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student: Student = match required_typed(req, "student") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if student.id.trim().is_empty() {
        return err(&req.id, "bad_params", "student.id must not be empty", None);
    }

    let duplicate = state.exam.find_student(&student.id).is_some();
    if duplicate {
        // Accepted anyway; lookups keep returning the first match.
        tracing::warn!(student_id = %student.id, "duplicate student id added");
    }
    let student_id = student.id.clone();
    let revision = state.exam.add_student(student);
    ok(
        &req.id,
        json!({
            "studentId": student_id,
            "duplicateId": duplicate,
            "revision": revision,
        }),
    )
}

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade = match optional_str(req, "grade") {
        Ok(v) => v.filter(|g| !g.is_empty()),
        Err(e) => return e,
    };
    let subjects: Vec<_> = state
        .exam
        .subjects()
        .iter()
        .filter(|s| grade.as_deref().map(|g| s.grade == g).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.filters" => Some(handle_students_filters(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "subjects.list" => Some(handle_subjects_list(state, req)),
        _ => None,
    }
}
