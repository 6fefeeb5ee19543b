//! AI Action service.
//!
//! One request names an [`Action`](codeops_protocol::Action) and carries a
//! file subset. The service
//!
//! - bounds the files again (at most [`MAX_FILES`] files of
//!   [`MAX_CONTENT_CHARS`] characters each),
//! - renders the action's prompt template ([`build_prompts`]),
//! - asks the [`ProviderRouter`] for a completion, trying the primary
//!   provider first for code-generation actions and falling back to the
//!   general one,
//! - extracts a JSON object from the reply, or returns the raw text under
//!   `rawResponse`.
//!
//! [`parse_code_blocks`] implements the `FILE: <path>` + fenced block
//! convention used by chat replies.

mod context;
mod error;
mod parse;
mod prompts;
pub mod provider;
mod service;

pub use context::{files_context, MAX_CONTENT_CHARS, MAX_FILES, TRUNCATION_MARKER};
pub use error::{ActionError, ProviderError};
pub use parse::{extract_json, parse_code_blocks};
pub use prompts::{build_prompts, PromptPair};
pub use provider::{
    ChatCompletionsProvider, ChatProvider, Completion, ProviderRouter, ProviderSettings,
};
pub use service::ActionHandler;
