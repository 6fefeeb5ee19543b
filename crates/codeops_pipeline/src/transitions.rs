use codeops_protocol::Stage;
use std::fmt;

/// A user-triggerable pipeline operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineAction {
    Clone,
    Analyze,
    Fix,
    Test,
    Measure,
    Record,
    Approve,
    Deploy,
    Reset,
}

impl PipelineAction {
    pub const ALL: [PipelineAction; 9] = [
        PipelineAction::Clone,
        PipelineAction::Analyze,
        PipelineAction::Fix,
        PipelineAction::Test,
        PipelineAction::Measure,
        PipelineAction::Record,
        PipelineAction::Approve,
        PipelineAction::Deploy,
        PipelineAction::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineAction::Clone => "clone",
            PipelineAction::Analyze => "analyze",
            PipelineAction::Fix => "fix",
            PipelineAction::Test => "test",
            PipelineAction::Measure => "measure",
            PipelineAction::Record => "record",
            PipelineAction::Approve => "approve",
            PipelineAction::Deploy => "deploy",
            PipelineAction::Reset => "reset",
        }
    }

    /// Whether this action may run at `stage`.
    ///
    /// Each step is unlocked by the stage its predecessor leaves behind
    /// (e.g. `Fix` once analysis ran, since analyze stays at `analyzing`).
    pub fn is_legal(&self, stage: Stage, has_repository: bool) -> bool {
        match self {
            PipelineAction::Clone => {
                stage != Stage::Cloning
                    && (!has_repository || matches!(stage, Stage::Idle | Stage::Error))
            }
            PipelineAction::Analyze => {
                has_repository && matches!(stage, Stage::Idle | Stage::Error)
            }
            PipelineAction::Fix => stage == Stage::Analyzing,
            PipelineAction::Test => stage == Stage::Fixing,
            PipelineAction::Measure => stage == Stage::Testing,
            PipelineAction::Record => stage == Stage::Measuring,
            PipelineAction::Approve => stage == Stage::Recording,
            PipelineAction::Deploy => stage == Stage::Approval,
            PipelineAction::Reset => true,
        }
    }
}

impl fmt::Display for PipelineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every action legal at `stage`, in pipeline order.
pub fn legal_actions(stage: Stage, has_repository: bool) -> Vec<PipelineAction> {
    PipelineAction::ALL
        .into_iter()
        .filter(|action| action.is_legal(stage, has_repository))
        .collect()
}
