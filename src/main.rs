mod bulk;
mod calc;
mod config;
mod filters;
mod ipc;
mod model;
mod render;
mod seed;
mod state;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::bulk::{BulkRunner, Delays};
use crate::config::Config;
use crate::state::ExamState;

fn init_tracing(log_level: &str) {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_level);

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<serde_json::Value>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = out_rx.recv().await {
            let mut line =
                serde_json::to_string(&msg).unwrap_or_else(|_| "{\"ok\":false}".to_string());
            line.push('\n');
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                tracing::error!(error = %e, "stdout write failed");
                break;
            }
            if let Err(e) = stdout.flush().await {
                tracing::error!(error = %e, "stdout flush failed");
                break;
            }
        }
    });

    let mut dataset = seed::sample_dataset();
    dataset.term = config.term.clone();
    dataset.academic_year = config.academic_year.clone();
    let mut exam = ExamState::new(dataset);

    let mut changes = exam.subscribe();
    let changes_out = out_tx.clone();
    let change_forwarder = tokio::spawn(async move {
        while let Some(change) = changes.recv().await {
            let _ = changes_out.send(ipc::state_changed(&change));
        }
    });

    let (bulk_tx, mut bulk_rx) = mpsc::unbounded_channel();
    let bulk_out = out_tx.clone();
    let bulk_forwarder = tokio::spawn(async move {
        while let Some(ev) = bulk_rx.recv().await {
            let _ = bulk_out.send(ipc::bulk_event(&ev));
        }
    });

    let mut state = ipc::AppState {
        exam,
        bulk: BulkRunner::new(Delays::from_config(&config), bulk_tx),
        config,
    };
    tracing::info!(
        term = state.exam.term(),
        academic_year = state.exam.academic_year(),
        students = state.exam.students().len(),
        "examd ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(v)) => v,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let _ = out_tx.send(ipc::bad_json(e.to_string()));
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = out_tx.send(resp);
    }

    // Let a running batch finish before shutting the channels down.
    state.bulk.wait_idle().await;
    drop(state);
    let _ = change_forwarder.await;
    let _ = bulk_forwarder.await;
    drop(out_tx);
    writer.await?;
    Ok(())
}
