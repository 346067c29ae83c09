use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_BUCKET_PREFIX, DEFAULT_RUN_LIMIT, RUN_INDICES, RUN_LIMIT_ENV};
use crate::domain::{AnatomyMode, AnatomyOutput, DataType, Onset, OutputKind, SensorMode, Subject};
use crate::error::HcpError;

pub const CONFIG_FILE_NAME: &str = "hcp-meg.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchConfig {
    pub subject: Subject,
    pub bucket_prefix: String,
    pub data_types: Vec<DataType>,
    pub outputs: Vec<OutputKind>,
    pub onsets: Vec<Onset>,
    pub run_indices: Vec<usize>,
    pub sensor_modes: Vec<SensorMode>,
    pub anatomy_outputs: Vec<AnatomyOutput>,
    pub anatomy_mode: AnatomyMode,
}

impl FetchConfig {
    pub fn for_subject(subject: Subject) -> Self {
        Self {
            subject,
            bucket_prefix: DEFAULT_BUCKET_PREFIX.to_string(),
            data_types: default_data_types(),
            outputs: OutputKind::ALL.to_vec(),
            onsets: vec![Onset::Stim],
            run_indices: RUN_INDICES.to_vec(),
            sensor_modes: vec![SensorMode::Mag],
            anatomy_outputs: default_anatomy_outputs(),
            anatomy_mode: AnatomyMode::Minimal,
        }
    }

    pub fn truncate_runs(&mut self, limit: usize) {
        self.run_indices.truncate(limit);
    }
}

pub fn default_data_types() -> Vec<DataType> {
    DataType::ALL
        .into_iter()
        .filter(|kind| !kind.is_noise())
        .collect()
}

pub fn default_anatomy_outputs() -> Vec<AnatomyOutput> {
    vec![
        AnatomyOutput::Label,
        AnatomyOutput::Mri,
        AnatomyOutput::Surf,
        AnatomyOutput::HeadModel,
        AnatomyOutput::Transforms,
    ]
}

pub fn parse_run_limit(value: Option<&str>) -> Result<usize, HcpError> {
    match value.map(str::trim) {
        None | Some("") => Ok(DEFAULT_RUN_LIMIT),
        Some(raw) => raw
            .parse::<usize>()
            .map(|limit| limit.min(RUN_INDICES.len()))
            .map_err(|_| HcpError::InvalidRunLimit(raw.to_string())),
    }
}

pub fn run_limit_from_env() -> Result<usize, HcpError> {
    parse_run_limit(std::env::var(RUN_LIMIT_ENV).ok().as_deref())
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub bucket_prefix: Option<String>,
    #[serde(default)]
    pub hcp_path: Option<String>,
    #[serde(default)]
    pub data_types: Option<Vec<String>>,
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
    #[serde(default)]
    pub onsets: Option<Vec<String>>,
    #[serde(default)]
    pub run_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub sensor_modes: Option<Vec<String>>,
    #[serde(default)]
    pub anatomy: Option<AnatomyEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnatomyEntry {
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub fetch: FetchConfig,
    pub hcp_path: Option<Utf8PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>, run_limit: usize) -> Result<ResolvedConfig, HcpError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        if path.is_none() && !config_path.exists() {
            return Err(HcpError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HcpError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| HcpError::ConfigParse(err.to_string()))?;
        debug!(path = %config_path.display(), "loaded config file");

        Self::resolve_config(config, run_limit)
    }

    pub fn resolve_config(config: Config, run_limit: usize) -> Result<ResolvedConfig, HcpError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let subject = match config.subject {
            Some(value) => value.parse()?,
            None => crate::constants::DEFAULT_SUBJECT.parse()?,
        };
        let mut fetch = FetchConfig::for_subject(subject);

        if let Some(prefix) = config.bucket_prefix {
            fetch.bucket_prefix = prefix;
        }
        if let Some(values) = config.data_types {
            fetch.data_types = parse_all(&values)?;
        }
        if let Some(values) = config.outputs {
            fetch.outputs = parse_all(&values)?;
        }
        if let Some(values) = config.onsets {
            fetch.onsets = parse_all(&values)?;
        }
        if let Some(values) = config.run_indices {
            fetch.run_indices = values;
        }
        if let Some(values) = config.sensor_modes {
            fetch.sensor_modes = parse_all(&values)?;
        }
        if let Some(anatomy) = config.anatomy {
            if let Some(values) = anatomy.outputs {
                fetch.anatomy_outputs = parse_all(&values)?;
            }
            if let Some(mode) = anatomy.mode {
                fetch.anatomy_mode = mode.parse()?;
            }
        }
        fetch.truncate_runs(run_limit);

        Ok(ResolvedConfig {
            schema_version,
            fetch,
            hcp_path: config.hcp_path.map(Utf8PathBuf::from),
        })
    }
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>, HcpError>
where
    T: std::str::FromStr<Err = HcpError>,
{
    values.iter().map(|value| value.parse()).collect()
}
