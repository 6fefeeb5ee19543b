use chrono::{DateTime, Utc};
use codeops_protocol::{
    file_name, AnalysisResult, FileSet, FixResult, MeasureReport, RepoFile, RepositoryInfo, Stage,
    TestReport,
};
use serde::{Deserialize, Serialize};

use crate::issues::mark_solved;
use crate::log::LogStream;
use crate::transitions::{legal_actions, PipelineAction};

/// Session state of one pipeline run.
///
/// `error` is set exactly when `stage` is [`Stage::Error`]; the setters below
/// keep the two in step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub stage: Stage,
    pub repository: Option<RepositoryInfo>,
    pub files: FileSet,
    pub analysis: Option<AnalysisResult>,
    pub fixes: Option<FixResult>,
    pub test_results: Option<TestReport>,
    pub metrics: Option<MeasureReport>,
    pub logs: LogStream,
    pub error: Option<String>,
    /// Number of resets so far. Survives the reset it counts, so observers
    /// can tell a restarted log stream from a continued one.
    #[serde(default)]
    pub resets: u64,
}

/// What applying a fix result changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOutcome {
    pub fixed_files: usize,
    pub issues_solved: u32,
}

impl PipelineState {
    /// Enter a non-error stage, clearing any previous error.
    pub fn set_stage(&mut self, stage: Stage) {
        debug_assert_ne!(stage, Stage::Error);
        self.stage = stage;
        self.error = None;
    }

    /// Enter the error stage with a user-facing message, also logged.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.logs.error(message.clone());
        self.stage = Stage::Error;
        self.error = Some(message);
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }

    pub fn legal_actions(&self) -> Vec<PipelineAction> {
        legal_actions(self.stage, self.has_repository())
    }

    /// Files sent to test/measure/record/approve: the latest fixed files if
    /// the last fix produced any, else the first `cap` files of the set.
    pub fn review_selection(&self, cap: usize) -> Vec<RepoFile> {
        match &self.fixes {
            Some(fix) if !fix.fixed_files.is_empty() => fix
                .fixed_files
                .iter()
                .map(|f| RepoFile {
                    path: f.path.clone(),
                    name: file_name(&f.path).to_string(),
                    content: f.content.clone(),
                })
                .collect(),
            _ => self.files.head(cap).to_vec(),
        }
    }

    /// Merge a fix result.
    ///
    /// Every fixed file replaces the file with the same path, or is appended
    /// when the path is new. Issues are then marked solved (see
    /// [`mark_solved`]) and the fix is stored with its solved count. A fix
    /// without files is stored as-is and changes nothing else.
    pub fn apply_fix_result(&mut self, mut fix: FixResult, now: DateTime<Utc>) -> FixOutcome {
        let fixed_files = fix.fixed_files.len();
        if fixed_files == 0 {
            self.fixes = Some(fix);
            return FixOutcome {
                fixed_files,
                issues_solved: 0,
            };
        }

        for file in &fix.fixed_files {
            self.files.write(file.path.clone(), file.content.clone());
        }

        let issues_solved = match self.analysis.as_mut() {
            Some(analysis) => mark_solved(analysis, &fix.fixed_files, now),
            None => 0,
        };

        fix.issues_solved = issues_solved;
        fix.applied_to_codebase = true;
        self.fixes = Some(fix);

        FixOutcome {
            fixed_files,
            issues_solved,
        }
    }
}
