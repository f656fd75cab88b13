//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the profiling core and an
//! external system (the source-control host, the generative text service).
//! Implementations live in `src/adapters/`.

pub mod llm;
pub mod source_host;

pub use llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};
pub use source_host::{
    EntryKind, FileEntry, HostError, HostFuture, PathContents, RepoRef, RepoScope, SourceHost,
};
