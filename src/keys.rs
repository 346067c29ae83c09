use std::collections::BTreeSet;

use tracing::debug;

use crate::config::FetchConfig;
use crate::domain::{AnatomyMode, AnatomyOutput, OutputKind, RemoteKey, Subject, trim_prefix};
use crate::error::HcpError;
use crate::file_mapping::{MegFileQuery, anatomy_file_paths, meg_file_paths};

const MAX_RUN_INDEX: usize = 2;

pub fn anatomy_keys(
    subject: &Subject,
    bucket_prefix: &str,
    outputs: &[AnatomyOutput],
    mode: AnatomyMode,
) -> Vec<RemoteKey> {
    outputs
        .iter()
        .flat_map(|output| anatomy_file_paths(subject, *output, mode))
        .map(|path| RemoteKey::new(bucket_prefix, &path))
        .collect()
}

/// Keys for every valid (data type, output, run, onset, sensor mode) combination.
///
/// Combinations HCP does not publish are skipped: outputs that do not apply
/// to a data type, runs beyond the session's run count, and onsets a task
/// does not define.
pub fn meg_keys(config: &FetchConfig) -> Result<Vec<RemoteKey>, HcpError> {
    validate_selection(config)?;

    let mut keys = Vec::new();
    for &data_type in &config.data_types {
        for &output in &config.outputs {
            if !output.applies_to(data_type) {
                debug!(%data_type, %output, "skipping output not published for data type");
                continue;
            }

            let mut queries = Vec::new();
            let base = MegFileQuery::new(&config.subject, data_type, output);
            if output.is_per_run() {
                for &run_index in &config.run_indices {
                    if run_index >= data_type.n_runs() {
                        continue;
                    }
                    let query = base.run_index(run_index);
                    if output == OutputKind::Epochs && data_type.is_task() {
                        queries.extend(
                            config
                                .onsets
                                .iter()
                                .filter(|onset| onset.label(data_type).is_some())
                                .map(|onset| query.onset(*onset)),
                        );
                    } else {
                        queries.push(query);
                    }
                }
            } else {
                queries.extend(config.sensor_modes.iter().map(|mode| base.sensor_mode(*mode)));
            }

            for query in queries {
                keys.extend(
                    meg_file_paths(&query)?
                        .into_iter()
                        .map(|path| RemoteKey::new(&config.bucket_prefix, &path)),
                );
            }
        }
    }
    Ok(keys)
}

pub fn enumerate_keys(config: &FetchConfig) -> Result<BTreeSet<RemoteKey>, HcpError> {
    let mut keys: BTreeSet<RemoteKey> = anatomy_keys(
        &config.subject,
        &config.bucket_prefix,
        &config.anatomy_outputs,
        config.anatomy_mode,
    )
    .into_iter()
    .collect();
    let anatomy = keys.len();
    keys.extend(meg_keys(config)?);
    debug!(
        subject = %config.subject,
        anatomy,
        meg = keys.len() - anatomy,
        "enumerated remote keys"
    );
    Ok(keys)
}

fn validate_selection(config: &FetchConfig) -> Result<(), HcpError> {
    let prefix = trim_prefix(&config.bucket_prefix);
    if prefix.is_empty() || !prefix.contains("://") {
        return Err(HcpError::InvalidBucketPrefix(config.bucket_prefix.clone()));
    }
    if config.data_types.is_empty() {
        return Err(HcpError::EmptySelection(
            "at least one data type is required".to_string(),
        ));
    }
    if let Some(&max) = config.run_indices.iter().max() {
        if max > MAX_RUN_INDEX {
            return Err(HcpError::RunIndexAboveMax(max));
        }
    }
    let wants = |output: OutputKind| {
        config.outputs.contains(&output) && config.data_types.iter().any(|t| output.applies_to(*t))
    };
    if wants(OutputKind::Epochs)
        && config.data_types.iter().any(|t| t.is_task())
        && config.onsets.is_empty()
    {
        return Err(HcpError::EmptySelection(
            "task epochs requested without any onset".to_string(),
        ));
    }
    if wants(OutputKind::Evoked) && config.sensor_modes.is_empty() {
        return Err(HcpError::EmptySelection(
            "evoked output requested without any sensor mode".to_string(),
        ));
    }
    Ok(())
}
