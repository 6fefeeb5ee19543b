//! Pipeline orchestrator.
//!
//! [`Orchestrator`] owns one session's [`PipelineState`] and exposes one
//! async operation per stage transition. Each operation calls one of the two
//! services through the [`RepositoryClient`] / [`ActionClient`] traits, merges
//! the result into state and appends to the [`LogStream`].
//!
//! The orchestrator never advances the stage on its own (apart from
//! `deploying -> complete`) and never rejects out-of-order calls; callers
//! consult [`legal_actions`] to decide what may run next.

pub mod chat;
pub mod client;
mod error;
mod issues;
mod log;
mod orchestrator;
mod state;
mod transitions;

pub use chat::{fix_issue_prompt, ChatReply};
pub use client::{ActionClient, ClientError, HttpClient, LocalClient, RepositoryClient};
pub use error::PipelineError;
pub use issues::mark_solved;
pub use log::LogStream;
pub use orchestrator::{Orchestrator, OrchestratorSettings, DEFAULT_DEPLOY_DELAY};
pub use state::{FixOutcome, PipelineState};
pub use transitions::{legal_actions, PipelineAction};

#[cfg(test)]
mod testing;
