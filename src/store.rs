use std::fs::{self, File};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::Serialize;
use tempfile::Builder;

use crate::domain::RemoteKey;
use crate::error::HcpError;

#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalFile {
    pub key: RemoteKey,
    pub path: Utf8PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    pub present: Vec<LocalFile>,
    pub missing: Vec<LocalFile>,
}

impl Store {
    pub fn new() -> Result<Self, HcpError> {
        let root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join("mne-hcp-data").join("HCP")).ok()
            })
            .ok_or_else(|| HcpError::Filesystem("unable to resolve home directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn relative_path(&self, relative: &str) -> Result<Utf8PathBuf, HcpError> {
        let relative = Utf8Path::new(relative);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Utf8Component::Normal(_)));
        if escapes || relative.as_str().is_empty() {
            return Err(HcpError::Filesystem(format!(
                "refusing path outside store root: {relative}"
            )));
        }
        Ok(self.root.join(relative))
    }

    pub fn local_path(&self, key: &RemoteKey, prefix: &str) -> Result<Utf8PathBuf, HcpError> {
        self.relative_path(key.relative_to(prefix)?)
    }

    pub fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().is_file()
    }

    pub fn partition<'a, I>(&self, keys: I, prefix: &str) -> Result<Partition, HcpError>
    where
        I: IntoIterator<Item = &'a RemoteKey>,
    {
        let mut partition = Partition::default();
        for key in keys {
            let path = self.local_path(key, prefix)?;
            let entry = LocalFile {
                key: key.clone(),
                path,
            };
            if self.exists(&entry.path) {
                partition.present.push(entry);
            } else {
                partition.missing.push(entry);
            }
        }
        Ok(partition)
    }

    pub fn write_atomic<F>(path: &Utf8Path, write: F) -> Result<u64, HcpError>
    where
        F: FnOnce(&mut File) -> Result<u64, HcpError>,
    {
        let parent = path
            .parent()
            .ok_or_else(|| HcpError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| HcpError::Filesystem(err.to_string()))?;
        let mut temp = Builder::new()
            .prefix(".hcp-meg-part")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| HcpError::Filesystem(err.to_string()))?;
        let written = write(temp.as_file_mut())?;
        temp.as_file()
            .sync_all()
            .map_err(|err| HcpError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| HcpError::Filesystem(err.to_string()))?;
        Ok(written)
    }
}
