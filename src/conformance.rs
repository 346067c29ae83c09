//! Executable checks of what an [`HcpReader`] must return for HCP MEG data.
//!
//! Each `check_*` function inspects one read result and reports the first
//! violated property as [`HcpError::Conformance`]. [`run_suite`] drives a
//! reader over every session and run and collects the outcomes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{
    BOUNDS_TOLERANCE, CONTINUOUS_EVENT_CODE, MEG_CHANNEL_PREFIX, N_MEG_CHANNELS, SFREQ_PREPROC,
    SFREQ_RAW, epoch_bounds, extra_channels,
};
use crate::domain::{DataType, Subject};
use crate::error::HcpError;
use crate::reader::{
    Annotations, ChannelCategory, Epochs, Evoked, EvokedKind, HcpReader, IcaCategory,
    RawRecording,
};

static BTI_CHANNEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A([0-9]+)$").expect("valid channel pattern"));

pub fn is_bti_channel(name: &str) -> bool {
    BTI_CHANNEL
        .captures(name)
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .is_some_and(|number| (1..=N_MEG_CHANNELS).contains(&number))
}

pub fn check_bounds(times: &[f64], bounds: (f64, f64), atol: f64) -> bool {
    let (Some(min), Some(max)) = (
        times.iter().copied().reduce(f64::min),
        times.iter().copied().reduce(f64::max),
    ) else {
        return false;
    };
    let (low, high) = (bounds.0.min(bounds.1), bounds.0.max(bounds.1));
    (min - low).abs() <= atol && (max - high).abs() <= atol
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn same_rounded(value: f64, decimals: i32, expected: f64) -> bool {
    (round_to(value, decimals) - expected).abs() < 1e-9
}

fn violation(message: String) -> HcpError {
    HcpError::Conformance(message)
}

pub fn check_annotations(annotations: &Annotations) -> Result<(), HcpError> {
    let channel_keys: Vec<_> = annotations.channels.keys().copied().collect();
    if channel_keys != ChannelCategory::ALL {
        return Err(violation(format!(
            "channel categories {channel_keys:?}, expected {:?}",
            ChannelCategory::ALL
        )));
    }
    for (category, names) in &annotations.channels {
        if let Some(name) = names.iter().find(|name| !is_bti_channel(name)) {
            return Err(violation(format!(
                "channel {name:?} in category {category:?} is not an MEG sensor"
            )));
        }
    }

    let ica_keys: Vec<_> = annotations.ica.keys().copied().collect();
    if ica_keys != IcaCategory::ALL {
        return Err(violation(format!(
            "ICA categories {ica_keys:?}, expected {:?}",
            IcaCategory::ALL
        )));
    }
    for (category, components) in &annotations.ica {
        if let Some(index) = components
            .iter()
            .find(|index| !(0..=N_MEG_CHANNELS as i64).contains(*index))
        {
            return Err(violation(format!(
                "ICA component {index} in category {category:?} out of range"
            )));
        }
    }
    Ok(())
}

pub fn check_raw(raw: &RawRecording) -> Result<(), HcpError> {
    let names = raw.meg_channel_names();
    if names.len() != N_MEG_CHANNELS {
        return Err(violation(format!(
            "{} MEG channels picked, expected {N_MEG_CHANNELS}",
            names.len()
        )));
    }
    if let Some(name) = names.iter().find(|name| !name.starts_with(MEG_CHANNEL_PREFIX)) {
        return Err(violation(format!(
            "MEG channel {name:?} lacks the {MEG_CHANNEL_PREFIX} prefix"
        )));
    }
    // Acquisition order is not alphabetical; a sorted list means the reader reordered channels.
    if names.windows(2).all(|pair| pair[0] <= pair[1]) {
        return Err(violation(
            "MEG channels are sorted, acquisition order was lost".to_string(),
        ));
    }
    if !same_rounded(raw.sfreq, 4, SFREQ_RAW) {
        return Err(violation(format!(
            "raw sampling rate {} Hz, expected {SFREQ_RAW}",
            raw.sfreq
        )));
    }
    Ok(())
}

pub fn check_epochs(
    epochs: &Epochs,
    annotations: &Annotations,
    data_type: DataType,
) -> Result<(), HcpError> {
    let expected = (N_MEG_CHANNELS + extra_channels(data_type))
        .saturating_sub(annotations.bad_channels().len());
    if epochs.ch_names.len() != expected {
        return Err(violation(format!(
            "{} epoch channels for {data_type}, expected {expected}",
            epochs.ch_names.len()
        )));
    }
    if !same_rounded(epochs.sfreq, 2, SFREQ_PREPROC) {
        return Err(violation(format!(
            "epochs sampling rate {} Hz, expected {SFREQ_PREPROC}",
            epochs.sfreq
        )));
    }
    let codes: BTreeSet<i64> = epochs.events.iter().map(|event| event[2]).collect();
    if codes != BTreeSet::from([CONTINUOUS_EVENT_CODE]) {
        return Err(violation(format!(
            "event codes {codes:?}, expected only {CONTINUOUS_EVENT_CODE}"
        )));
    }
    check_times(&epochs.times, data_type)
}

pub fn check_evoked(
    evoked: &[Evoked],
    annotations: &[Annotations],
    data_type: DataType,
) -> Result<(), HcpError> {
    let first = evoked
        .first()
        .ok_or_else(|| violation(format!("no evoked responses for {data_type}")))?;

    let n_average = evoked
        .iter()
        .filter(|item| item.kind == EvokedKind::Average)
        .count();
    if n_average * 2 != evoked.len() {
        return Err(violation(format!(
            "{n_average} averages among {} evoked entries, expected half",
            evoked.len()
        )));
    }

    let bads: BTreeSet<&str> = annotations
        .iter()
        .flat_map(|annots| annots.bad_channels())
        .map(String::as_str)
        .collect();
    let expected = (N_MEG_CHANNELS + extra_channels(data_type)).saturating_sub(bads.len());
    if first.ch_names.len() != expected {
        return Err(violation(format!(
            "{} evoked channels for {data_type}, expected {expected}",
            first.ch_names.len()
        )));
    }
    check_times(&first.times, data_type)
}

fn check_times(times: &[f64], data_type: DataType) -> Result<(), HcpError> {
    let bounds = epoch_bounds(data_type)
        .ok_or_else(|| violation(format!("{data_type} recordings are not epoched")))?;
    if !check_bounds(times, bounds, BOUNDS_TOLERANCE) {
        return Err(violation(format!(
            "time axis of {data_type} does not span {bounds:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check: &'static str,
    pub data_type: DataType,
    pub run_index: Option<usize>,
    pub passed: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }

    fn record(
        &mut self,
        check: &'static str,
        data_type: DataType,
        run_index: Option<usize>,
        result: Result<(), HcpError>,
    ) {
        let outcome = CheckOutcome {
            check,
            data_type,
            run_index,
            passed: result.is_ok(),
            detail: result.err().map(|err| err.to_string()),
        };
        debug!(check, %data_type, ?run_index, passed = outcome.passed, "conformance check");
        self.outcomes.push(outcome);
    }
}

pub fn run_suite<R: HcpReader>(
    reader: &R,
    rest_subject: &Subject,
    task_subject: &Subject,
) -> SuiteReport {
    let mut report = SuiteReport::default();
    let subject_for = |data_type: DataType| {
        if data_type.is_rest() {
            rest_subject
        } else {
            task_subject
        }
    };

    for data_type in DataType::ALL.into_iter().filter(|kind| !kind.is_noise()) {
        for run_index in 0..data_type.n_runs() {
            let result = reader
                .read_annotations(subject_for(data_type), data_type, run_index)
                .and_then(|annots| check_annotations(&annots));
            report.record("annotations", data_type, Some(run_index), result);
        }
    }

    // Every session is probed one run past its end to confirm the range error.
    for data_type in DataType::ALL {
        for run_index in 0..=data_type.n_runs() {
            let read = reader.read_raw(subject_for(data_type), data_type, run_index);
            let result = if run_index < data_type.n_runs() {
                read.and_then(|raw| check_raw(&raw))
            } else {
                match read {
                    Err(HcpError::RunIndexOutOfRange { .. }) => Ok(()),
                    Err(other) => Err(violation(format!(
                        "run {run_index} should be out of range, got: {other}"
                    ))),
                    Ok(_) => Err(violation(format!(
                        "run {run_index} should be out of range but was read"
                    ))),
                }
            };
            report.record("raw", data_type, Some(run_index), result);
        }
    }

    for data_type in DataType::ALL.into_iter().filter(|kind| !kind.is_noise()) {
        let subject = subject_for(data_type);
        let result = reader
            .read_annotations(subject, data_type, 0)
            .and_then(|annots| {
                let epochs = reader.read_epochs(subject, data_type, 0)?;
                check_epochs(&epochs, &annots, data_type)
            });
        report.record("epochs", data_type, Some(0), result);
    }

    for data_type in DataType::TASKS {
        let result = (0..data_type.n_runs())
            .map(|run_index| reader.read_annotations(task_subject, data_type, run_index))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|annots| {
                let evoked = reader.read_evoked(task_subject, data_type)?;
                check_evoked(&evoked, &annots, data_type)
            });
        report.record("evoked", data_type, None, result);
    }

    info!(
        checks = report.outcomes.len(),
        failures = report.failures().count(),
        "conformance suite finished"
    );
    report
}
