//! Progress notification helpers for LSP $/progress notifications.
//!
//! Workspace formatting reports one `Begin`, a `Report` per file and one
//! `End` under a token that is unique per run, so the client can cancel a
//! specific run through `window/workDoneProgress/cancel`.

use tower_lsp_server::ls_types::{
    NumberOrString, ProgressParams, ProgressParamsValue, WorkDoneProgress, WorkDoneProgressBegin,
    WorkDoneProgressEnd, WorkDoneProgressReport,
};

use crate::format::{BatchProgress, BatchTally};

const TOKEN_PREFIX: &str = "rustfmt-ls/formatWorkspace";

/// Creates a progress token for one workspace formatting run.
///
/// Format: `rustfmt-ls/formatWorkspace/{run}`
pub fn progress_token(run: u64) -> NumberOrString {
    NumberOrString::String(format!("{}/{}", TOKEN_PREFIX, run))
}

/// Whether `token` names a workspace formatting run.
pub fn is_workspace_token(token: &NumberOrString) -> bool {
    matches!(token, NumberOrString::String(s) if s.starts_with(TOKEN_PREFIX))
}

pub fn create_progress_begin(token: NumberOrString, total: usize) -> ProgressParams {
    ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: "Formatting workspace".to_string(),
            cancellable: Some(true),
            message: Some(format!("{} files", total)),
            percentage: Some(0),
        })),
    }
}

pub fn create_progress_report(token: NumberOrString, progress: &BatchProgress) -> ProgressParams {
    ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(true),
            message: Some(progress.message()),
            percentage: Some(progress.percentage()),
        })),
    }
}

pub fn create_progress_end(token: NumberOrString, tally: &BatchTally) -> ProgressParams {
    ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
            message: Some(tally.summary()),
        })),
    }
}
