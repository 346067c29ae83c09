//! Read contract for HCP MEG data.
//!
//! Decoding the 4D raw files and the MATLAB derivatives belongs to an
//! analysis library. This module fixes what such a reader hands back so the
//! fetch tooling and the `conformance` checks can be written against it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{DataType, Subject};
use crate::error::HcpError;
use crate::file_mapping::run_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelCategory {
    All,
    Ica,
    Manual,
    NeighCorr,
    NeighStdratio,
}

impl ChannelCategory {
    pub const ALL: [ChannelCategory; 5] = [
        ChannelCategory::All,
        ChannelCategory::Ica,
        ChannelCategory::Manual,
        ChannelCategory::NeighCorr,
        ChannelCategory::NeighStdratio,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcaCategory {
    Bad,
    BrainIc,
    BrainIcNumber,
    BrainIcVs,
    BrainIcVsNumber,
    EcgEogIc,
    Flag,
    Good,
    Physio,
    TotalIcNumber,
}

impl IcaCategory {
    pub const ALL: [IcaCategory; 10] = [
        IcaCategory::Bad,
        IcaCategory::BrainIc,
        IcaCategory::BrainIcNumber,
        IcaCategory::BrainIcVs,
        IcaCategory::BrainIcVsNumber,
        IcaCategory::EcgEogIc,
        IcaCategory::Flag,
        IcaCategory::Good,
        IcaCategory::Physio,
        IcaCategory::TotalIcNumber,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub channels: BTreeMap<ChannelCategory, Vec<String>>,
    pub ica: BTreeMap<IcaCategory, Vec<i64>>,
}

impl Annotations {
    pub fn bad_channels(&self) -> &[String] {
        self.channels
            .get(&ChannelCategory::All)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Meg,
    RefMeg,
    Emg,
    Ecg,
    Eog,
    Stim,
    Misc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecording {
    pub channels: Vec<Channel>,
    pub sfreq: f64,
}

impl RawRecording {
    pub fn ch_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|channel| channel.name.as_str())
    }

    pub fn meg_channel_names(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|channel| channel.kind == ChannelKind::Meg)
            .map(|channel| channel.name.as_str())
            .collect()
    }
}

pub type Event = [i64; 3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epochs {
    pub ch_names: Vec<String>,
    pub sfreq: f64,
    pub events: Vec<Event>,
    pub times: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvokedKind {
    Average,
    StandardError,
}

impl fmt::Display for EvokedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvokedKind::Average => write!(f, "average"),
            EvokedKind::StandardError => write!(f, "standard_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evoked {
    pub comment: String,
    pub kind: EvokedKind,
    pub ch_names: Vec<String>,
    pub times: Vec<f64>,
}

/// Access to a subject's HCP MEG data below some local root.
///
/// Implementations must call [`validate_run_index`] before touching disk so
/// an impossible run surfaces as [`HcpError::RunIndexOutOfRange`].
pub trait HcpReader {
    fn read_annotations(
        &self,
        subject: &Subject,
        data_type: DataType,
        run_index: usize,
    ) -> Result<Annotations, HcpError>;

    fn read_raw(
        &self,
        subject: &Subject,
        data_type: DataType,
        run_index: usize,
    ) -> Result<RawRecording, HcpError>;

    fn read_epochs(
        &self,
        subject: &Subject,
        data_type: DataType,
        run_index: usize,
    ) -> Result<Epochs, HcpError>;

    fn read_evoked(&self, subject: &Subject, data_type: DataType) -> Result<Vec<Evoked>, HcpError>;
}

pub fn validate_run_index(data_type: DataType, run_index: usize) -> Result<&'static str, HcpError> {
    run_label(data_type, run_index)
}
