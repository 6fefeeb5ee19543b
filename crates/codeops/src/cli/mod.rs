//! CLI commands.
//!
//! `serve` hosts the services; `run` and `chat` drive a pipeline session in
//! the terminal, printing the log stream as it grows.

pub mod chat;
pub mod output;
pub mod run;
pub mod serve;

use anyhow::{bail, Result};
use codeops_pipeline::{Orchestrator, PipelineAction, PipelineState};
use codeops_protocol::LogEntry;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Refuse an action the transition table does not allow at the current
/// stage. The orchestrator itself never rejects out-of-order calls.
pub fn ensure_legal(orchestrator: &Orchestrator, action: PipelineAction) -> Result<()> {
    let state = orchestrator.snapshot();
    if !state.legal_actions().contains(&action) {
        bail!("Cannot {} while the pipeline is at stage '{}'", action, state.stage);
    }
    Ok(())
}

/// Position in the log stream of one session.
#[derive(Debug, Default)]
struct LogCursor {
    resets: u64,
    printed: usize,
}

impl LogCursor {
    /// Entries appended since the last call. After a reset the stream
    /// starts over, however far it has grown back.
    fn advance<'a>(&mut self, state: &'a PipelineState) -> &'a [LogEntry] {
        if state.resets != self.resets || state.logs.len() < self.printed {
            self.resets = state.resets;
            self.printed = 0;
        }
        let fresh = &state.logs.entries()[self.printed..];
        self.printed = state.logs.len();
        fresh
    }
}

/// Print log entries as they are appended. Ends when the orchestrator is
/// dropped.
pub fn spawn_log_printer(mut updates: watch::Receiver<PipelineState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cursor = LogCursor::default();
        loop {
            {
                let state = updates.borrow_and_update();
                for entry in cursor.advance(&state) {
                    println!("{}", output::format_log_entry(entry));
                }
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_cursor_prints_each_entry_once() {
        let mut cursor = LogCursor::default();
        let mut state = PipelineState::default();
        state.logs.info("one");
        assert_eq!(messages(cursor.advance(&state)), ["one"]);

        state.logs.info("two");
        state.logs.info("three");
        assert_eq!(messages(cursor.advance(&state)), ["two", "three"]);
        assert!(cursor.advance(&state).is_empty());
    }

    #[test]
    fn test_cursor_restarts_after_reset_that_regrew() {
        let mut cursor = LogCursor::default();
        let mut state = PipelineState::default();
        state.logs.info("old 1");
        state.logs.info("old 2");
        cursor.advance(&state);

        // Reset, then three new entries before the printer wakes.
        let mut state = PipelineState {
            resets: 1,
            ..PipelineState::default()
        };
        state.logs.info("new 1");
        state.logs.info("new 2");
        state.logs.info("new 3");
        assert_eq!(messages(cursor.advance(&state)), ["new 1", "new 2", "new 3"]);
    }
}
