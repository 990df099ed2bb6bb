use serde::Serialize;
use tokio::sync::mpsc;

use crate::model::{Dataset, ExamResult, Student, Subject};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum StateChange {
    #[serde(rename_all = "camelCase")]
    StudentAdded { student_id: String, revision: u64 },
    #[serde(rename_all = "camelCase")]
    ResultsReplaced { count: usize, revision: u64 },
    #[serde(rename_all = "camelCase")]
    TermChanged { term: String, revision: u64 },
}

/// Session state for the dashboard. Passed explicitly to whoever needs it;
/// views learn about mutations through `subscribe`.
pub struct ExamState {
    students: Vec<Student>,
    subjects: Vec<Subject>,
    results: Vec<ExamResult>,
    term: String,
    academic_year: String,
    revision: u64,
    subscribers: Vec<mpsc::UnboundedSender<StateChange>>,
}

impl ExamState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            students: dataset.students,
            subjects: dataset.subjects,
            results: dataset.results,
            term: dataset.term,
            academic_year: dataset.academic_year,
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Every mutation after this call is delivered to the receiver, in
    /// order. Nothing is dropped however far the receiver falls behind.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn results(&self) -> &[ExamResult] {
        &self.results
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// First student with the id. Duplicate ids are possible; later ones are
    /// shadowed.
    pub fn find_student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn results_for<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a ExamResult> {
        self.results.iter().filter(move |r| r.student_id == student_id)
    }

    /// Appends without checking for an existing id.
    pub fn add_student(&mut self, student: Student) -> u64 {
        let student_id = student.id.clone();
        self.students.push(student);
        let revision = self.bump();
        self.notify(StateChange::StudentAdded {
            student_id,
            revision,
        });
        revision
    }

    pub fn replace_results(&mut self, results: Vec<ExamResult>) -> u64 {
        let count = results.len();
        self.results = results;
        let revision = self.bump();
        self.notify(StateChange::ResultsReplaced { count, revision });
        revision
    }

    /// Only the label changes; existing results stay as they are.
    pub fn set_term(&mut self, term: impl Into<String>) -> u64 {
        self.term = term.into();
        let revision = self.bump();
        self.notify(StateChange::TermChanged {
            term: self.term.clone(),
            revision,
        });
        revision
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn notify(&mut self, change: StateChange) {
        // Closed receivers are pruned.
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_dataset;

    fn student(id: &str) -> Student {
        Student {
            id: id.to_string(),
            name: "New Student".to_string(),
            grade: "Grade 9".to_string(),
            section: "C".to_string(),
            email: "new.student@school.edu".to_string(),
        }
    }

    #[test]
    fn add_student_accepts_duplicate_ids() {
        let mut state = ExamState::new(sample_dataset());
        state.add_student(student("S001"));
        assert_eq!(state.students().len(), 8);
        assert_eq!(state.students().iter().filter(|s| s.id == "S001").count(), 2);
        assert_eq!(state.find_student("S001").map(|s| s.name.as_str()), Some("John Smith"));
    }

    #[test]
    fn mutations_notify_subscribers_in_order() {
        let mut state = ExamState::new(sample_dataset());
        let mut rx = state.subscribe();

        state.add_student(student("S100"));
        state.set_term("Second Term");
        state.replace_results(Vec::new());

        assert_eq!(
            rx.try_recv().expect("first change"),
            StateChange::StudentAdded {
                student_id: "S100".to_string(),
                revision: 1
            }
        );
        assert_eq!(
            rx.try_recv().expect("second change"),
            StateChange::TermChanged {
                term: "Second Term".to_string(),
                revision: 2
            }
        );
        assert_eq!(
            rx.try_recv().expect("third change"),
            StateChange::ResultsReplaced {
                count: 0,
                revision: 3
            }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(state.revision(), 3);
    }

    #[test]
    fn slow_subscriber_still_sees_every_change() {
        let mut state = ExamState::new(sample_dataset());
        let mut rx = state.subscribe();

        for i in 0..500 {
            state.set_term(format!("Term {}", i));
        }

        let mut revisions = Vec::new();
        while let Ok(change) = rx.try_recv() {
            match change {
                StateChange::TermChanged { revision, .. } => revisions.push(revision),
                other => panic!("unexpected change: {:?}", other),
            }
        }
        assert_eq!(revisions, (1..=500).collect::<Vec<u64>>());
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut state = ExamState::new(sample_dataset());
        let rx = state.subscribe();
        let mut kept = state.subscribe();
        drop(rx);

        state.set_term("Second Term");
        assert_eq!(state.subscribers.len(), 1);
        assert!(matches!(
            kept.try_recv(),
            Ok(StateChange::TermChanged { revision: 1, .. })
        ));
    }

    #[test]
    fn set_term_keeps_results() {
        let mut state = ExamState::new(sample_dataset());
        let before = state.results().len();
        state.set_term("Third Term");
        assert_eq!(state.term(), "Third Term");
        assert_eq!(state.results().len(), before);
        assert_eq!(state.academic_year(), "2024");
    }

    #[test]
    fn replace_results_drops_previous_rows() {
        let mut state = ExamState::new(sample_dataset());
        assert_eq!(state.results_for("S001").count(), 4);
        state.replace_results(Vec::new());
        assert!(state.results().is_empty());
        assert_eq!(state.results_for("S001").count(), 0);
    }
}
