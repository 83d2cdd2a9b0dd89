// ============================================================
// Crate Error Type
// ============================================================
// Every fallible helper in the library returns this error.
// Nothing is recovered or retried locally. Each variant is
// handed straight back to the caller, and the binary wraps it
// with anyhow context at the edge.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures surfaced by the utility functions.
#[derive(Debug, Error)]
pub enum UtilError {
    /// `set_seed` was called without a seed
    #[error("must provide a seed")]
    MissingSeed,

    /// A device string that is not `cpu`, `cuda` or `cuda:<index>`
    #[error("unrecognised device specification '{0}'")]
    InvalidDevice(String),

    /// The optimizer exposes a parameter-group list, but it is empty
    #[error("optimizer has no parameter groups")]
    EmptyParamGroups,

    /// A plain mapping was passed without a `param_groups` entry
    #[error("optimizer mapping has no 'param_groups' list")]
    MissingParamGroups,

    #[error("parameter group {index} has no numeric 'lr'")]
    MissingLearningRate { index: usize },

    #[error("cannot read checkpoint directory '{}': {source}", .path.display())]
    CheckpointDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The accelerator management tool could not be started at all
    #[error("accelerator management interface '{binary}' unavailable: {source}")]
    GpuUnavailable {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The tool started but reported a failure
    #[error("GPU query failed: {0}")]
    GpuQuery(String),

    #[error("malformed GPU query output line: '{0}'")]
    MalformedSmiOutput(String),

    #[error("unknown memory kind '{0}' (expected used, total or free)")]
    InvalidMemoryKind(String),

    /// Reading a tensor back to host memory failed
    #[error("tensor data conversion failed: {0}")]
    TensorData(String),

    #[error("padding index {index} out of range for {rows} embeddings")]
    PaddingIndex { index: usize, rows: usize },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, UtilError>;
