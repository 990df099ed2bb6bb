use crate::model::{Dataset, ExamResult, Student, Subject};

pub const DEFAULT_TERM: &str = "First Term";
pub const DEFAULT_ACADEMIC_YEAR: &str = "2024";

const STUDENTS: &[(&str, &str, &str, &str, &str)] = &[
    ("S001", "John Smith", "Grade 10", "A", "john.smith@school.edu"),
    ("S002", "Emma Johnson", "Grade 10", "A", "emma.johnson@school.edu"),
    ("S003", "Michael Brown", "Grade 10", "B", "michael.brown@school.edu"),
    ("S004", "Sarah Davis", "Grade 9", "A", "sarah.davis@school.edu"),
    ("S005", "David Wilson", "Grade 9", "B", "david.wilson@school.edu"),
    ("S006", "Lisa Anderson", "Grade 10", "B", "lisa.anderson@school.edu"),
    ("S007", "James Miller", "Grade 9", "A", "james.miller@school.edu"),
];

const SUBJECTS: &[(&str, &str, &str)] = &[
    ("MATH", "Mathematics", "Grade 10"),
    ("ENG", "English", "Grade 10"),
    ("SCI", "Science", "Grade 10"),
    ("SOC", "Social Studies", "Grade 10"),
    ("MATH9", "Mathematics", "Grade 9"),
    ("ENG9", "English", "Grade 9"),
    ("SCI9", "Science", "Grade 9"),
    ("SOC9", "Social Studies", "Grade 9"),
];

// (student, subject, marks, stored grade); every paper is out of 100.
const RESULTS: &[(&str, &str, f64, &str)] = &[
    // Grade 10, section A
    ("S001", "MATH", 85.0, "A"),
    ("S001", "ENG", 78.0, "B"),
    ("S001", "SCI", 92.0, "A+"),
    ("S001", "SOC", 88.0, "A"),
    ("S002", "MATH", 95.0, "A+"),
    ("S002", "ENG", 89.0, "A"),
    ("S002", "SCI", 91.0, "A+"),
    ("S002", "SOC", 87.0, "A"),
    // Grade 10, section B
    ("S003", "MATH", 72.0, "B"),
    ("S003", "ENG", 68.0, "C"),
    ("S003", "SCI", 75.0, "B"),
    ("S003", "SOC", 79.0, "B"),
    ("S006", "MATH", 88.0, "A"),
    ("S006", "ENG", 82.0, "A"),
    ("S006", "SCI", 85.0, "A"),
    ("S006", "SOC", 80.0, "A"),
    // Grade 9, section A
    ("S004", "MATH9", 82.0, "A"),
    ("S004", "ENG9", 76.0, "B"),
    ("S004", "SCI9", 85.0, "A"),
    ("S004", "SOC9", 79.0, "B"),
    ("S007", "MATH9", 65.0, "C"),
    ("S007", "ENG9", 71.0, "B"),
    ("S007", "SCI9", 68.0, "C"),
    ("S007", "SOC9", 74.0, "B"),
    // Grade 9, section B
    ("S005", "MATH9", 91.0, "A+"),
    ("S005", "ENG9", 84.0, "A"),
    ("S005", "SCI9", 89.0, "A"),
    ("S005", "SOC9", 86.0, "A"),
];

fn subject_name(subject_id: &str) -> String {
    SUBJECTS
        .iter()
        .find(|(id, _, _)| *id == subject_id)
        .map(|(_, name, _)| name.to_string())
        .unwrap_or_else(|| subject_id.to_string())
}

/// Fresh copy of the compiled-in sample data.
pub fn sample_dataset() -> Dataset {
    let students = STUDENTS
        .iter()
        .map(|(id, name, grade, section, email)| Student {
            id: id.to_string(),
            name: name.to_string(),
            grade: grade.to_string(),
            section: section.to_string(),
            email: email.to_string(),
        })
        .collect();

    let subjects = SUBJECTS
        .iter()
        .map(|(id, name, grade)| Subject {
            id: id.to_string(),
            name: name.to_string(),
            grade: grade.to_string(),
        })
        .collect();

    let results = RESULTS
        .iter()
        .map(|(student_id, subject_id, marks, grade)| ExamResult {
            student_id: student_id.to_string(),
            subject_id: subject_id.to_string(),
            subject_name: subject_name(subject_id),
            marks: *marks,
            total_marks: 100.0,
            grade: grade.to_string(),
        })
        .collect();

    Dataset {
        students,
        subjects,
        results,
        term: DEFAULT_TERM.to_string(),
        academic_year: DEFAULT_ACADEMIC_YEAR.to_string(),
    }
}
