use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::HcpError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Subject {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        // Subjects become path segments, so separators are rejected along with blanks.
        if normalized.is_empty() || normalized.contains('/') || normalized.contains('\\') {
            return Err(HcpError::InvalidSubject(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

impl TryFrom<String> for Subject {
    type Error = HcpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DataType {
    Rest,
    TaskStoryMath,
    TaskWorkingMemory,
    TaskMotor,
    NoiseEmptyRoom,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::Rest,
        DataType::TaskStoryMath,
        DataType::TaskWorkingMemory,
        DataType::TaskMotor,
        DataType::NoiseEmptyRoom,
    ];

    pub const TASKS: [DataType; 3] = [
        DataType::TaskStoryMath,
        DataType::TaskWorkingMemory,
        DataType::TaskMotor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Rest => "rest",
            DataType::TaskStoryMath => "task_story_math",
            DataType::TaskWorkingMemory => "task_working_memory",
            DataType::TaskMotor => "task_motor",
            DataType::NoiseEmptyRoom => "noise_empty_room",
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            DataType::Rest => "Restin",
            DataType::TaskStoryMath => "StoryM",
            DataType::TaskWorkingMemory => "Wrkmem",
            DataType::TaskMotor => "Motort",
            DataType::NoiseEmptyRoom => "Rnoise",
        }
    }

    pub fn run_labels(&self) -> &'static [&'static str] {
        match self {
            DataType::NoiseEmptyRoom => &["1"],
            DataType::Rest => &["3", "4", "5"],
            DataType::TaskWorkingMemory => &["6", "7"],
            DataType::TaskStoryMath => &["8", "9"],
            DataType::TaskMotor => &["10", "11"],
        }
    }

    pub fn n_runs(&self) -> usize {
        self.run_labels().len()
    }

    pub fn is_task(&self) -> bool {
        matches!(
            self,
            DataType::TaskStoryMath | DataType::TaskWorkingMemory | DataType::TaskMotor
        )
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, DataType::NoiseEmptyRoom)
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, DataType::Rest)
    }

    pub fn context(&self) -> &'static str {
        if self.is_rest() { "rmeg" } else { "tmeg" }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        DataType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| HcpError::UnknownDataType(value.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OutputKind {
    Raw,
    Epochs,
    Ica,
    Evoked,
    TrialInfo,
    Bads,
}

impl OutputKind {
    pub const ALL: [OutputKind; 6] = [
        OutputKind::Raw,
        OutputKind::Epochs,
        OutputKind::Ica,
        OutputKind::Evoked,
        OutputKind::TrialInfo,
        OutputKind::Bads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Raw => "raw",
            OutputKind::Epochs => "epochs",
            OutputKind::Ica => "ica",
            OutputKind::Evoked => "evoked",
            OutputKind::TrialInfo => "trial_info",
            OutputKind::Bads => "bads",
        }
    }

    pub fn applies_to(&self, data_type: DataType) -> bool {
        match self {
            OutputKind::Raw | OutputKind::Bads => true,
            OutputKind::Epochs | OutputKind::Ica => !data_type.is_noise(),
            OutputKind::Evoked | OutputKind::TrialInfo => data_type.is_task(),
        }
    }

    pub fn is_per_run(&self) -> bool {
        !matches!(self, OutputKind::Evoked)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| HcpError::UnknownOutput(value.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Onset {
    Stim,
    Resp,
}

impl Onset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Onset::Stim => "stim",
            Onset::Resp => "resp",
        }
    }

    pub fn label(&self, data_type: DataType) -> Option<&'static str> {
        match (self, data_type) {
            (Onset::Stim, DataType::TaskWorkingMemory) => Some("TIM"),
            (Onset::Stim, DataType::TaskStoryMath) => Some("TEV"),
            (Onset::Stim, DataType::TaskMotor) => Some("TEMG"),
            (Onset::Resp, DataType::TaskWorkingMemory) => Some("TRESP"),
            (Onset::Resp, DataType::TaskStoryMath) => Some("TRESP"),
            _ => None,
        }
    }
}

impl fmt::Display for Onset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Onset {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "stim" => Ok(Onset::Stim),
            "resp" => Ok(Onset::Resp),
            _ => Err(HcpError::UnknownOnset(value.to_string())),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    #[default]
    Mag,
    Planar,
}

impl SensorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorMode::Mag => "mag",
            SensorMode::Planar => "planar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorMode::Mag => "MODE-mag",
            SensorMode::Planar => "MODE-planar",
        }
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SensorMode {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "mag" => Ok(SensorMode::Mag),
            "planar" => Ok(SensorMode::Planar),
            _ => Err(HcpError::UnknownSensorMode(value.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum AnatomyOutput {
    Label,
    Mri,
    Surf,
    HeadModel,
    Transforms,
    SourceModel,
}

impl AnatomyOutput {
    pub const ALL: [AnatomyOutput; 6] = [
        AnatomyOutput::Label,
        AnatomyOutput::Mri,
        AnatomyOutput::Surf,
        AnatomyOutput::HeadModel,
        AnatomyOutput::Transforms,
        AnatomyOutput::SourceModel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnatomyOutput::Label => "label",
            AnatomyOutput::Mri => "mri",
            AnatomyOutput::Surf => "surf",
            AnatomyOutput::HeadModel => "head_model",
            AnatomyOutput::Transforms => "transforms",
            AnatomyOutput::SourceModel => "source_model",
        }
    }

    pub fn is_freesurfer(&self) -> bool {
        matches!(
            self,
            AnatomyOutput::Label | AnatomyOutput::Mri | AnatomyOutput::Surf
        )
    }
}

impl fmt::Display for AnatomyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnatomyOutput {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        AnatomyOutput::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| HcpError::UnknownAnatomyOutput(value.to_string()))
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnatomyMode {
    #[default]
    Minimal,
    Full,
}

impl FromStr for AnatomyMode {
    type Err = HcpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "minimal" => Ok(AnatomyMode::Minimal),
            "full" => Ok(AnatomyMode::Full),
            _ => Err(HcpError::UnknownAnatomyMode(value.to_string())),
        }
    }
}

impl fmt::Display for AnatomyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnatomyMode::Minimal => write!(f, "minimal"),
            AnatomyMode::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteKey(String);

impl RemoteKey {
    pub fn new(prefix: &str, relative: &str) -> Self {
        Self(format!("{}/{}", trim_prefix(prefix), relative))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn relative_to(&self, prefix: &str) -> Result<&str, HcpError> {
        self.0
            .strip_prefix(trim_prefix(prefix))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| HcpError::KeyOutsidePrefix {
                key: self.0.clone(),
                prefix: prefix.to_string(),
            })
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn trim_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}
