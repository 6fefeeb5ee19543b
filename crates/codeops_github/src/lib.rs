//! Repository Fetch service.
//!
//! Turns a GitHub repository URL into repository metadata plus a bounded
//! snapshot of its source files:
//!
//! 1. [`RepoSlug::parse`] extracts `owner/repo` (input errors never touch
//!    the network).
//! 2. [`RepoFetcher`] asks a [`RepoSource`] for metadata, then walks the
//!    contents tree depth-first, skipping dot-directories and dependency
//!    directories, keeping only allow-listed extensions.
//! 3. Each file is downloaded individually and truncated; a failed download
//!    is logged and skipped, never fatal.
//!
//! [`GitHubClient`] is the production [`RepoSource`] over the GitHub REST API.

mod client;
mod error;
mod fetcher;
mod limits;
mod slug;
mod source;

pub use client::{GitHubClient, DEFAULT_API_BASE, USER_AGENT};
pub use error::FetchError;
pub use fetcher::{FetchedRepository, RepoFetcher};
pub use limits::FetchLimits;
pub use slug::RepoSlug;
pub use source::{ContentEntry, EntryKind, RepoSource};
