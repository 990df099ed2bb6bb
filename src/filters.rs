use serde::Serialize;

use crate::model::Student;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be a string or null")]
pub struct FilterError {
    pub field: &'static str,
}

/// Roster narrowing used by the students and bulk screens. Empty fields
/// match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFilter {
    pub search: Option<String>,
    pub grade: Option<String>,
    pub section: Option<String>,
}

fn optional_str(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &'static str,
) -> Result<Option<String>, FilterError> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(FilterError { field });
            };
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(Some(s.to_string()))
            }
        }
    }
}

impl RosterFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, FilterError> {
        let Some(obj) = params.as_object() else {
            return Ok(Self::default());
        };
        Ok(Self {
            search: optional_str(obj, "search")?,
            grade: optional_str(obj, "grade")?,
            section: optional_str(obj, "section")?,
        })
    }

    pub fn matches(&self, student: &Student) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map(|needle| {
                let needle = needle.to_lowercase();
                student.name.to_lowercase().contains(&needle)
                    || student.id.to_lowercase().contains(&needle)
                    || student.email.to_lowercase().contains(&needle)
            })
            .unwrap_or(true);
        let grade_ok = self
            .grade
            .as_deref()
            .map(|g| student.grade == g)
            .unwrap_or(true);
        let section_ok = self
            .section
            .as_deref()
            .map(|s| student.section == s)
            .unwrap_or(true);
        search_ok && grade_ok && section_ok
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Grade levels in first-seen roster order.
pub fn distinct_grades(students: &[Student]) -> Vec<String> {
    distinct(students.iter().map(|s| s.grade.as_str()))
}

pub fn distinct_sections(students: &[Student]) -> Vec<String> {
    distinct(students.iter().map(|s| s.section.as_str()))
}
