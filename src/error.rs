use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HcpError {
    #[error("invalid subject identifier: {0:?}")]
    InvalidSubject(String),

    #[error(
        "unknown HCP data type `{0}` (expected one of: rest, task_story_math, task_working_memory, task_motor, noise_empty_room)"
    )]
    UnknownDataType(String),

    #[error(
        "unknown HCP output `{0}` (expected one of: raw, epochs, ica, evoked, trial_info, bads)"
    )]
    UnknownOutput(String),

    #[error("unknown onset `{0}` (expected one of: stim, resp)")]
    UnknownOnset(String),

    #[error("unknown sensor mode `{0}` (expected one of: mag, planar)")]
    UnknownSensorMode(String),

    #[error(
        "unknown anatomy output `{0}` (expected one of: label, mri, surf, head_model, transforms, source_model)"
    )]
    UnknownAnatomyOutput(String),

    #[error("unknown anatomy mode `{0}` (expected one of: minimal, full)")]
    UnknownAnatomyMode(String),

    #[error("for data type `{data_type}` there are {runs} runs, run index {run_index} requested")]
    RunIndexOutOfRange {
        data_type: String,
        runs: usize,
        run_index: usize,
    },

    #[error("HCP MEG data has no run index above 2, found {0}")]
    RunIndexAboveMax(usize),

    #[error("HCP does not provide output `{output}` for data type `{data_type}`")]
    OutputUnavailable { data_type: String, output: String },

    #[error("onset `{onset}` is not defined for data type `{data_type}`")]
    OnsetUnavailable { data_type: String, onset: String },

    #[error("empty selection: {0}")]
    EmptySelection(String),

    #[error("invalid bucket prefix: {0}")]
    InvalidBucketPrefix(String),

    #[error("key {key} does not live under prefix {prefix}")]
    KeyOutsidePrefix { key: String, prefix: String },

    #[error("invalid run limit in MNE_HCP_N_RUNS: {0:?}")]
    InvalidRunLimit(String),

    #[error("missing config file hcp-meg.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("remote request failed: {0}")]
    RemoteHttp(String),

    #[error("remote returned status {status} for {key}: {message}")]
    RemoteStatus {
        key: String,
        status: u16,
        message: String,
    },

    #[error("read contract violated: {0}")]
    Conformance(String),
}
