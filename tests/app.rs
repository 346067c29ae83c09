use std::fs::File;
use std::io::Write;
use std::sync::Mutex;

use camino::Utf8PathBuf;

use hcp_meg_fetch::app::{App, FetchOptions};
use hcp_meg_fetch::config::FetchConfig;
use hcp_meg_fetch::domain::{AnatomyOutput, DataType, OutputKind, RemoteKey};
use hcp_meg_fetch::error::HcpError;
use hcp_meg_fetch::file_mapping::MegFileQuery;
use hcp_meg_fetch::output::JsonOutput;
use hcp_meg_fetch::remote::RemoteClient;
use hcp_meg_fetch::store::Store;

#[derive(Default)]
struct MockRemote {
    calls: Mutex<Vec<RemoteKey>>,
}

impl RemoteClient for MockRemote {
    fn download(&self, key: &RemoteKey, destination: &mut File) -> Result<u64, HcpError> {
        self.calls.lock().unwrap().push(key.clone());
        destination.write_all(b"data").unwrap();
        Ok(4)
    }
}

struct FailingRemote;

impl RemoteClient for FailingRemote {
    fn download(&self, key: &RemoteKey, _destination: &mut File) -> Result<u64, HcpError> {
        Err(HcpError::RemoteStatus {
            key: key.to_string(),
            status: 403,
            message: "AccessDenied".to_string(),
        })
    }
}

fn small_config() -> FetchConfig {
    let mut config = FetchConfig::for_subject("105923".parse().unwrap());
    config.data_types = vec![DataType::TaskMotor];
    config.outputs = vec![OutputKind::Bads];
    config.run_indices = vec![0];
    config.anatomy_outputs = vec![AnatomyOutput::Transforms];
    config
}

fn temp_store() -> (tempfile::TempDir, Store) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("HCP")).unwrap();
    (temp, Store::new_with_root(root))
}

#[test]
fn fetch_downloads_missing_then_reuses() {
    let (_temp, store) = temp_store();
    let app = App::new(store, MockRemote::default());
    let config = small_config();

    let first = app
        .fetch(&config, FetchOptions::default(), &JsonOutput)
        .unwrap();
    assert_eq!(first.count("downloaded"), 5);
    assert!(first.items.iter().all(|item| std::path::Path::new(&item.path).is_file()));

    let second = app
        .fetch(&config, FetchOptions::default(), &JsonOutput)
        .unwrap();
    assert_eq!(second.count("downloaded"), 0);
    assert_eq!(second.count("present"), 5);
}

#[test]
fn dry_run_touches_nothing() {
    let (_temp, store) = temp_store();
    let root = store.root().to_owned();
    let app = App::new(store, MockRemote::default());
    let options = FetchOptions {
        force: false,
        dry_run: true,
    };

    let result = app.fetch(&small_config(), options, &JsonOutput).unwrap();
    assert_eq!(result.count("planned"), 5);
    assert!(!root.as_std_path().exists());
}

#[test]
fn force_downloads_present_files_again() {
    let (_temp, store) = temp_store();
    let app = App::new(store, MockRemote::default());
    let config = small_config();
    app.fetch(&config, FetchOptions::default(), &JsonOutput)
        .unwrap();

    let options = FetchOptions {
        force: true,
        dry_run: false,
    };
    let result = app.fetch(&config, options, &JsonOutput).unwrap();
    assert_eq!(result.count("downloaded"), 5);
    assert_eq!(result.count("present"), 0);
}

#[test]
fn status_counts_local_files() {
    let (_temp, store) = temp_store();
    let app = App::new(store, MockRemote::default());
    let config = small_config();

    let before = app.status(&config, &JsonOutput).unwrap();
    assert_eq!(before.present, 0);
    assert_eq!(before.missing.len(), 5);

    app.fetch(&config, FetchOptions::default(), &JsonOutput)
        .unwrap();
    let after = app.status(&config, &JsonOutput).unwrap();
    assert_eq!(after.present, 5);
    assert!(after.missing.is_empty());
}

#[test]
fn remote_failure_propagates() {
    let (_temp, store) = temp_store();
    let app = App::new(store, FailingRemote);
    let err = app
        .fetch(&small_config(), FetchOptions::default(), &JsonOutput)
        .unwrap_err();
    assert!(matches!(err, HcpError::RemoteStatus { status: 403, .. }));
}

#[test]
fn paths_resolve_under_root() {
    let (_temp, store) = temp_store();
    let root = store.root().to_owned();
    let app = App::new(store, MockRemote::default());
    let subject = "105923".parse().unwrap();
    let query = MegFileQuery::new(&subject, DataType::Rest, OutputKind::Ica).run_index(1);

    let result = app.paths(&query).unwrap();
    let dir = root.join("105923/MEG/Restin/icaclass");
    assert_eq!(
        result.paths,
        vec![
            dir.join("105923_MEG_4-Restin_icaclass_vs.mat"),
            dir.join("105923_MEG_4-Restin_icaclass_vs.txt"),
            dir.join("105923_MEG_4-Restin_icaclass.mat"),
            dir.join("105923_MEG_4-Restin_icaclass.txt"),
        ]
    );

    let out_of_range = MegFileQuery::new(&subject, DataType::Rest, OutputKind::Ica).run_index(3);
    assert!(matches!(
        app.paths(&out_of_range),
        Err(HcpError::RunIndexOutOfRange { .. })
    ));
}

#[test]
fn results_serialize_with_local_paths() {
    let (_temp, store) = temp_store();
    let root = store.root().to_owned();
    let app = App::new(store, MockRemote::default());
    let subject = "105923".parse().unwrap();
    let query = MegFileQuery::new(&subject, DataType::TaskMotor, OutputKind::TrialInfo);

    let paths = serde_json::to_value(app.paths(&query).unwrap()).unwrap();
    assert_eq!(
        paths["paths"][0],
        root.join("105923/MEG/Motort/tmegpreproc/105923_MEG_10-Motort_tmegpreproc_trialinfo.mat")
            .as_str()
    );

    let status = serde_json::to_value(app.status(&small_config(), &JsonOutput).unwrap()).unwrap();
    let missing = status["missing"].as_array().unwrap();
    assert_eq!(missing.len(), 5);
    assert!(missing.iter().all(|entry| {
        entry["path"]
            .as_str()
            .is_some_and(|path| path.starts_with(root.as_str()))
    }));
}
