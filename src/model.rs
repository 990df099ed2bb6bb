use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Grade level label, e.g. "Grade 10".
    pub grade: String,
    pub section: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub grade: String,
}

/// One subject result for one student. Rows are not unique per
/// (student, subject); duplicates are kept and summed like any other row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub student_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub marks: f64,
    pub total_marks: f64,
    /// Letter grade as stored with the row. Never recomputed.
    #[serde(default)]
    pub grade: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub results: Vec<ExamResult>,
    pub term: String,
    pub academic_year: String,
}
