use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::model::{ExamResult, Student};
use crate::state::ExamState;

const TOP_PERFORMERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GradeLetter {
    F,
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl GradeLetter {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeLetter::APlus => "A+",
            GradeLetter::A => "A",
            GradeLetter::B => "B",
            GradeLetter::C => "C",
            GradeLetter::D => "D",
            GradeLetter::F => "F",
        }
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed thresholds, highest first. Marks are not range-checked: anything
/// above 100 is still A+, anything negative (or NaN) is F.
pub fn grade_letter(marks: f64) -> GradeLetter {
    if marks >= 90.0 {
        GradeLetter::APlus
    } else if marks >= 80.0 {
        GradeLetter::A
    } else if marks >= 70.0 {
        GradeLetter::B
    } else if marks >= 60.0 {
        GradeLetter::C
    } else if marks >= 50.0 {
        GradeLetter::D
    } else {
        GradeLetter::F
    }
}

/// Borrowed view of everything report assembly reads.
#[derive(Debug, Clone, Copy)]
pub struct CalcContext<'a> {
    pub students: &'a [Student],
    pub results: &'a [ExamResult],
    pub term: &'a str,
    pub academic_year: &'a str,
}

impl<'a> CalcContext<'a> {
    pub fn from_state(state: &'a ExamState) -> Self {
        Self {
            students: state.students(),
            results: state.results(),
            term: state.term(),
            academic_year: state.academic_year(),
        }
    }

    #[cfg(test)]
    pub fn from_dataset(ds: &'a crate::model::Dataset) -> Self {
        Self {
            students: &ds.students,
            results: &ds.results,
            term: &ds.term,
            academic_year: &ds.academic_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermReport {
    pub student: Student,
    pub term: String,
    pub academic_year: String,
    pub results: Vec<ExamResult>,
    pub total_marks: f64,
    /// Sum of each paper's `totalMarks`. Display only.
    pub max_marks: f64,
    pub average: f64,
    pub overall_grade: GradeLetter,
    pub has_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MarksTally {
    count: usize,
    total: f64,
}

impl MarksTally {
    fn of<'r, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'r ExamResult>,
    {
        let mut tally = MarksTally {
            count: 0,
            total: 0.0,
        };
        for r in rows {
            tally.count += 1;
            tally.total += r.marks;
        }
        tally
    }

    // Mean of raw marks by row count. Papers with a different `totalMarks`
    // scale are not normalised.
    fn average(self) -> f64 {
        if self.count > 0 {
            self.total / (self.count as f64)
        } else {
            0.0
        }
    }
}

fn rows_for<'r>(
    results: &'r [ExamResult],
    student_id: &'r str,
) -> impl Iterator<Item = &'r ExamResult> {
    results.iter().filter(move |r| r.student_id == student_id)
}

/// Builds the report card for one student from scratch. `None` when the id
/// is not on the roster.
pub fn term_report(ctx: &CalcContext<'_>, student_id: &str) -> Option<TermReport> {
    let student = ctx.students.iter().find(|s| s.id == student_id)?;

    let results: Vec<ExamResult> = rows_for(ctx.results, student_id).cloned().collect();
    let tally = MarksTally::of(&results);
    let max_marks: f64 = results.iter().map(|r| r.total_marks).sum();
    let average = tally.average();

    Some(TermReport {
        student: student.clone(),
        term: ctx.term.to_string(),
        academic_year: ctx.academic_year.to_string(),
        has_data: !results.is_empty(),
        results,
        total_marks: tally.total,
        max_marks,
        average,
        overall_grade: grade_letter(average),
    })
}

pub fn student_average(results: &[ExamResult], student_id: &str) -> f64 {
    MarksTally::of(rows_for(results, student_id)).average()
}

pub fn subject_count(results: &[ExamResult], student_id: &str) -> usize {
    rows_for(results, student_id).count()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    #[serde(flatten)]
    pub student: Student,
    pub average: f64,
    pub subject_count: usize,
    pub has_results: bool,
    pub overall_grade: GradeLetter,
}

pub fn roster_row(results: &[ExamResult], student: &Student) -> RosterRow {
    let average = student_average(results, &student.id);
    let subjects = subject_count(results, &student.id);
    RosterRow {
        student: student.clone(),
        average,
        subject_count: subjects,
        has_results: subjects > 0,
        overall_grade: grade_letter(average),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub section: String,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub total_subjects: usize,
    pub overall_average: f64,
    pub top_performers: Vec<TopPerformer>,
    pub term: String,
    pub academic_year: String,
}

pub fn dashboard_summary(ctx: &CalcContext<'_>) -> DashboardSummary {
    let total_subjects = ctx
        .results
        .iter()
        .map(|r| r.subject_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut ranked: Vec<TopPerformer> = ctx
        .students
        .iter()
        .map(|s| TopPerformer {
            id: s.id.clone(),
            name: s.name.clone(),
            grade: s.grade.clone(),
            section: s.section.clone(),
            average: student_average(ctx.results, &s.id),
        })
        .collect();

    // Students without results count as 0 in the class average.
    let overall_average = if ranked.is_empty() {
        0.0
    } else {
        ranked.iter().map(|p| p.average).sum::<f64>() / (ranked.len() as f64)
    };

    // Stable sort: ties keep roster order.
    ranked.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap_or(Ordering::Equal));
    ranked.truncate(TOP_PERFORMERS);

    DashboardSummary {
        total_students: ctx.students.len(),
        total_subjects,
        overall_average,
        top_performers: ranked,
        term: ctx.term.to_string(),
        academic_year: ctx.academic_year.to_string(),
    }
}
