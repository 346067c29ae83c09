use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::config::FetchConfig;
use crate::domain::RemoteKey;
use crate::error::HcpError;
use crate::file_mapping::{MegFileQuery, meg_file_paths};
use crate::keys::enumerate_keys;
use crate::remote::RemoteClient;
use crate::store::{LocalFile, Store};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub subject: String,
    pub bucket_prefix: String,
    pub keys: Vec<RemoteKey>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsResult {
    pub paths: Vec<Utf8PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub subject: String,
    pub root: String,
    pub present: usize,
    pub missing: Vec<LocalFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub subject: String,
    pub fetched_at: String,
    pub items: Vec<FetchItemResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub key: RemoteKey,
    pub path: String,
    pub action: String,
    pub bytes: Option<u64>,
}

impl FetchResult {
    pub fn count(&self, action: &str) -> usize {
        self.items.iter().filter(|item| item.action == action).count()
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<R: RemoteClient> {
    store: Store,
    remote: R,
}

impl<R: RemoteClient> App<R> {
    pub fn new(store: Store, remote: R) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn plan(&self, config: &FetchConfig) -> Result<PlanResult, HcpError> {
        let keys = enumerate_keys(config)?;
        Ok(PlanResult {
            subject: config.subject.to_string(),
            bucket_prefix: config.bucket_prefix.clone(),
            keys: keys.into_iter().collect(),
        })
    }

    pub fn paths(&self, query: &MegFileQuery<'_>) -> Result<PathsResult, HcpError> {
        let paths = meg_file_paths(query)?
            .iter()
            .map(|relative| self.store.relative_path(relative))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PathsResult { paths })
    }

    pub fn status(
        &self,
        config: &FetchConfig,
        sink: &dyn ProgressSink,
    ) -> Result<StatusResult, HcpError> {
        let keys = enumerate_keys(config)?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} keys for subject {}", keys.len(), config.subject),
            elapsed: None,
        });
        let partition = self.store.partition(&keys, &config.bucket_prefix)?;
        Ok(StatusResult {
            subject: config.subject.to_string(),
            root: self.store.root().to_string(),
            present: partition.present.len(),
            missing: partition.missing,
        })
    }

    pub fn fetch(
        &self,
        config: &FetchConfig,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, HcpError> {
        let keys = enumerate_keys(config)?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} keys for subject {}", keys.len(), config.subject),
            elapsed: None,
        });

        let partition = self.store.partition(&keys, &config.bucket_prefix)?;
        let mut items = Vec::with_capacity(keys.len());
        for entry in partition.present.iter() {
            if !options.force {
                items.push(FetchItemResult {
                    key: entry.key.clone(),
                    path: entry.path.to_string(),
                    action: "present".to_string(),
                    bytes: None,
                });
            }
        }

        let pending = partition
            .missing
            .iter()
            .chain(partition.present.iter().filter(|_| options.force));
        for entry in pending {
            if options.dry_run {
                items.push(FetchItemResult {
                    key: entry.key.clone(),
                    path: entry.path.to_string(),
                    action: "planned".to_string(),
                    bytes: None,
                });
                continue;
            }

            let started = Instant::now();
            let bytes =
                Store::write_atomic(&entry.path, |file| self.remote.download(&entry.key, file))?;
            sink.event(ProgressEvent {
                message: format!("phase=Download; {}", entry.key),
                elapsed: Some(started.elapsed()),
            });
            items.push(FetchItemResult {
                key: entry.key.clone(),
                path: entry.path.to_string(),
                action: "downloaded".to_string(),
                bytes: Some(bytes),
            });
        }

        let result = FetchResult {
            subject: config.subject.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            items,
        };
        info!(
            subject = %config.subject,
            downloaded = result.count("downloaded"),
            present = result.count("present"),
            planned = result.count("planned"),
            "fetch finished"
        );
        Ok(result)
    }
}
