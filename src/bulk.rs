use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::calc::{term_report, CalcContext, TermReport};
use crate::config::Config;
use crate::render::rendered_card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Print,
    Download,
}

impl OperationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "print" => Some(OperationKind::Print),
            "download" => Some(OperationKind::Download),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Print => "print",
            OperationKind::Download => "download",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub student_id: String,
    /// Display name of the student.
    pub student: String,
    pub kind: OperationKind,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
}

#[derive(Debug, Clone)]
pub enum BulkEvent {
    Progress {
        run_id: Uuid,
        kind: OperationKind,
        progress: Progress,
        entry: CompletionEntry,
    },
    Completed {
        run_id: Uuid,
        kind: OperationKind,
        log: Vec<CompletionEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkError {
    #[error("a {} run is already in progress", .0.as_str())]
    Busy(OperationKind),
    #[error("no students selected")]
    EmptySelection,
    #[error("unknown student ids: {}", .0.join(", "))]
    UnknownStudents(Vec<String>),
}

impl BulkError {
    pub fn code(&self) -> &'static str {
        match self {
            BulkError::Busy(_) => "busy",
            BulkError::EmptySelection => "empty_selection",
            BulkError::UnknownStudents(_) => "not_found",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatus {
    pub running: bool,
    pub run_id: Option<Uuid>,
    pub kind: Option<OperationKind>,
    pub progress: Progress,
    /// Entries of the current run, or of the last finished one.
    pub log: Vec<CompletionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTicket {
    pub run_id: Uuid,
    pub kind: OperationKind,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Delays {
    pub print: Duration,
    pub download: Duration,
}

impl Delays {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            print: cfg.print_delay,
            download: cfg.download_delay,
        }
    }

    fn for_kind(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Print => self.print,
            OperationKind::Download => self.download,
        }
    }
}

/// Runs simulated print/download batches one student at a time. At most one
/// batch is in flight; a second `start` is refused until it finishes.
#[derive(Clone)]
pub struct BulkRunner {
    status: Arc<Mutex<BulkStatus>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    delays: Delays,
    events: mpsc::UnboundedSender<BulkEvent>,
}

impl BulkRunner {
    pub fn new(delays: Delays, events: mpsc::UnboundedSender<BulkEvent>) -> Self {
        Self {
            status: Arc::new(Mutex::new(BulkStatus::default())),
            task: Arc::new(Mutex::new(None)),
            delays,
            events,
        }
    }

    pub fn status(&self) -> BulkStatus {
        self.status.lock().clone()
    }

    /// Validates the selection, assembles every report from `ctx` up front
    /// and spawns the batch. Later state changes are not seen by the batch.
    /// Must be called from within a tokio runtime.
    pub fn start(
        &self,
        ctx: &CalcContext<'_>,
        kind: OperationKind,
        selection: &[String],
    ) -> Result<RunTicket, BulkError> {
        let mut seen = HashSet::new();
        let ids: Vec<&String> = selection.iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(BulkError::EmptySelection);
        }

        let mut reports = Vec::with_capacity(ids.len());
        let mut unknown = Vec::new();
        for id in ids {
            match term_report(ctx, id) {
                Some(report) => reports.push(report),
                None => unknown.push(id.clone()),
            }
        }
        if !unknown.is_empty() {
            return Err(BulkError::UnknownStudents(unknown));
        }

        let run_id = Uuid::new_v4();
        let total = reports.len();
        {
            let mut st = self.status.lock();
            if st.running {
                return Err(BulkError::Busy(st.kind.unwrap_or(kind)));
            }
            *st = BulkStatus {
                running: true,
                run_id: Some(run_id),
                kind: Some(kind),
                progress: Progress { current: 0, total },
                log: Vec::new(),
            };
        }

        tracing::info!(%run_id, kind = kind.as_str(), total, "bulk run started");
        let runner = self.clone();
        let handle = tokio::spawn(async move {
            runner.run(run_id, kind, reports).await;
        });
        *self.task.lock() = Some(handle);

        Ok(RunTicket {
            run_id,
            kind,
            total,
        })
    }

    /// Resolves once the in-flight batch (if any) has finished.
    pub async fn wait_idle(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "bulk run task failed");
            }
        }
    }

    async fn run(&self, run_id: Uuid, kind: OperationKind, reports: Vec<TermReport>) {
        let delay = self.delays.for_kind(kind);
        let total = reports.len();

        for (i, report) in reports.iter().enumerate() {
            tokio::time::sleep(delay).await;

            let artifact = match kind {
                OperationKind::Print => None,
                OperationKind::Download => {
                    let card = rendered_card(report);
                    Some(Artifact {
                        bytes: card.bytes,
                        sha256: card.sha256,
                    })
                }
            };
            let entry = CompletionEntry {
                student_id: report.student.id.clone(),
                student: report.student.name.clone(),
                kind,
                success: true,
                timestamp: Utc::now(),
                artifact,
            };
            let progress = Progress {
                current: i + 1,
                total,
            };
            {
                let mut st = self.status.lock();
                st.progress = progress;
                st.log.push(entry.clone());
            }

            match kind {
                OperationKind::Print => {
                    tracing::info!(%run_id, student = %entry.student, "printed report")
                }
                OperationKind::Download => {
                    tracing::info!(%run_id, student = %entry.student, "downloaded report")
                }
            }
            let _ = self.events.send(BulkEvent::Progress {
                run_id,
                kind,
                progress,
                entry,
            });
        }

        let log = {
            let mut st = self.status.lock();
            st.running = false;
            st.progress = Progress::default();
            st.log.clone()
        };
        tracing::info!(%run_id, kind = kind.as_str(), completed = log.len(), "bulk run finished");
        let _ = self.events.send(BulkEvent::Completed { run_id, kind, log });
    }
}
