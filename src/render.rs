use sha2::{Digest, Sha256};
use std::fmt::Write;

use crate::calc::TermReport;

const RULE_WIDTH: usize = 56;

fn fmt_marks(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

/// Plain-text report card, the printable counterpart of the preview pane.
pub fn report_card_text(report: &TermReport) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "REPORT CARD");
    let _ = writeln!(out, "{} {}", report.term, report.academic_year);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Student: {} ({})", report.student.name, report.student.id);
    let _ = writeln!(
        out,
        "Class:   {}, Section {}",
        report.student.grade, report.student.section
    );
    let _ = writeln!(out, "Email:   {}", report.student.email);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{:<24}{:>10}{:>10}{:>8}", "Subject", "Marks", "Total", "Grade");

    if report.results.is_empty() {
        let _ = writeln!(out, "No results recorded for this term.");
    }
    for r in &report.results {
        let _ = writeln!(
            out,
            "{:<24}{:>10}{:>10}{:>8}",
            r.subject_name,
            fmt_marks(r.marks),
            fmt_marks(r.total_marks),
            r.grade
        );
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Total:   {} / {}",
        fmt_marks(report.total_marks),
        fmt_marks(report.max_marks)
    );
    let _ = writeln!(out, "Average: {:.1}%", report.average);
    let _ = writeln!(out, "Overall: {}", report.overall_grade);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub bytes: usize,
    pub sha256: String,
}

/// What a simulated download produces in place of a PDF.
pub fn rendered_card(report: &TermReport) -> RenderedCard {
    let text = report_card_text(report);
    let digest = Sha256::digest(text.as_bytes());
    RenderedCard {
        bytes: text.len(),
        sha256: hex::encode(digest),
    }
}
