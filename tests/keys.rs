use std::collections::BTreeSet;

use assert_matches::assert_matches;

use hcp_meg_fetch::config::FetchConfig;
use hcp_meg_fetch::constants::DEFAULT_BUCKET_PREFIX;
use hcp_meg_fetch::domain::{AnatomyMode, AnatomyOutput, DataType, Onset, OutputKind};
use hcp_meg_fetch::error::HcpError;
use hcp_meg_fetch::keys::{anatomy_keys, enumerate_keys, meg_keys};

fn config() -> FetchConfig {
    FetchConfig::for_subject("105923".parse().unwrap())
}

fn key(relative: &str) -> String {
    format!("{DEFAULT_BUCKET_PREFIX}/{relative}")
}

#[test]
fn enumeration_is_idempotent_and_duplicate_free() {
    let config = config();
    let first = enumerate_keys(&config).unwrap();
    let second = enumerate_keys(&config).unwrap();
    assert_eq!(first, second);

    let listed = anatomy_keys(
        &config.subject,
        &config.bucket_prefix,
        &config.anatomy_outputs,
        config.anatomy_mode,
    )
    .len()
        + meg_keys(&config).unwrap().len();
    assert_eq!(listed, first.len());
    assert!(first.iter().all(|k| k.as_str().starts_with(DEFAULT_BUCKET_PREFIX)));
}

#[test]
fn default_selection_contains_expected_keys() {
    let keys: BTreeSet<String> = enumerate_keys(&config())
        .unwrap()
        .into_iter()
        .map(|k| k.to_string())
        .collect();

    for expected in [
        "105923/MEG/anatomy/105923_MEG_anatomy_transform.txt",
        "105923/MEG/anatomy/105923_MEG_anatomy_headmodel.mat",
        "105923/T1w/105923/mri/T1.mgz",
        "105923/unprocessed/MEG/3-Restin/4D/c,rfDC",
        "105923/unprocessed/MEG/11-Motort/4D/config",
        "105923/MEG/Restin/rmegpreproc/105923_MEG_5-Restin_rmegpreproc.mat",
        "105923/MEG/StoryM/tmegpreproc/105923_MEG_8-StoryM_tmegpreproc_TEV.mat",
        "105923/MEG/Wrkmem/tmegpreproc/105923_MEG_6-Wrkmem_tmegpreproc_trialinfo.mat",
        "105923/MEG/Motort/icaclass/105923_MEG_10-Motort_icaclass_vs.mat",
        "105923/MEG/Motort/icaclass/105923_MEG_10-Motort_icaclass_vs.txt",
        "105923/MEG/Restin/icaclass/105923_MEG_3-Restin_icaclass.txt",
        "105923/MEG/Restin/baddata/105923_MEG_4-Restin_baddata_badchannels.txt",
        "105923/MEG/Restin/baddata/105923_MEG_4-Restin_baddata_manual_badsegments.txt",
        "105923/MEG/Wrkmem/eravg/105923_MEG_Wrkmem_eravg_[LM-TIM-0B]_[BT-diff]_[MODE-mag].mat",
    ] {
        assert!(keys.contains(&key(expected)), "missing {expected}");
    }

    assert!(!keys.iter().any(|k| k.contains("Rnoise")));
    assert!(!keys.iter().any(|k| k.contains("Restin") && k.contains("trialinfo")));
    assert!(!keys.iter().any(|k| k.contains("Restin/eravg")));
    // Tasks have two runs; run index 2 never produces a key.
    assert!(!keys.iter().any(|k| k.contains("12-Motort")));
}

#[test]
fn counts_for_a_narrow_selection() {
    let mut config = config();
    config.data_types = vec![DataType::TaskMotor];
    config.outputs = vec![OutputKind::Bads, OutputKind::Epochs];
    config.anatomy_outputs = vec![AnatomyOutput::Transforms];

    let keys = enumerate_keys(&config).unwrap();
    // 2 motor runs x (4 bads files + 1 epochs file) + 1 transform.
    assert_eq!(keys.len(), 11);
}

#[test]
fn annotation_files_for_one_rest_run() {
    let mut config = config();
    config.data_types = vec![DataType::Rest];
    config.outputs = vec![OutputKind::Ica, OutputKind::Bads];
    config.run_indices = vec![0];

    let keys: Vec<String> = meg_keys(&config)
        .unwrap()
        .into_iter()
        .map(|k| k.to_string())
        .collect();
    let stem = "105923/MEG/Restin";
    let expected: Vec<String> = [
        "icaclass/105923_MEG_3-Restin_icaclass_vs.mat",
        "icaclass/105923_MEG_3-Restin_icaclass_vs.txt",
        "icaclass/105923_MEG_3-Restin_icaclass.mat",
        "icaclass/105923_MEG_3-Restin_icaclass.txt",
        "baddata/105923_MEG_3-Restin_baddata_badchannels.txt",
        "baddata/105923_MEG_3-Restin_baddata_badsegments.txt",
        "baddata/105923_MEG_3-Restin_baddata_manual_badchannels.txt",
        "baddata/105923_MEG_3-Restin_baddata_manual_badsegments.txt",
    ]
    .iter()
    .map(|name| key(&format!("{stem}/{name}")))
    .collect();
    assert_eq!(keys.len(), expected.len());
    for name in &expected {
        assert!(keys.contains(name), "missing {name}");
    }
}

#[test]
fn run_limit_keeps_first_runs_only() {
    let mut config = config();
    config.truncate_runs(1);
    let keys = enumerate_keys(&config).unwrap();
    assert!(keys.iter().any(|k| k.as_str().contains("3-Restin")));
    assert!(!keys.iter().any(|k| k.as_str().contains("4-Restin")));
    assert!(!keys.iter().any(|k| k.as_str().contains("7-Wrkmem")));
}

#[test]
fn trailing_slash_prefix_is_equivalent() {
    let mut slashed = config();
    slashed.bucket_prefix = format!("{DEFAULT_BUCKET_PREFIX}/");
    assert_eq!(
        enumerate_keys(&slashed).unwrap(),
        enumerate_keys(&config()).unwrap()
    );
}

#[test]
fn evoked_keys_do_not_depend_on_runs() {
    let mut one_run = config();
    one_run.data_types = vec![DataType::TaskStoryMath];
    one_run.outputs = vec![OutputKind::Evoked];
    one_run.run_indices = vec![0];
    let mut all_runs = one_run.clone();
    all_runs.run_indices = vec![0, 1, 2];

    assert_eq!(
        enumerate_keys(&one_run).unwrap(),
        enumerate_keys(&all_runs).unwrap()
    );
}

#[test]
fn response_onset_skips_motor_epochs() {
    let mut config = config();
    config.data_types = vec![DataType::TaskMotor, DataType::TaskWorkingMemory];
    config.outputs = vec![OutputKind::Epochs];
    config.onsets = vec![Onset::Resp];
    let keys = meg_keys(&config).unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.as_str().ends_with("_TRESP.mat")));
}

#[test]
fn noise_keys_when_requested() {
    let mut config = config();
    config.data_types = vec![DataType::NoiseEmptyRoom];
    config.outputs = vec![OutputKind::Raw, OutputKind::TrialInfo];
    let keys = meg_keys(&config).unwrap();
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| k.as_str().contains("/1-Rnoise/4D/")));
}

#[test]
fn full_anatomy_adds_source_models() {
    let subject = "105923".parse().unwrap();
    let keys = anatomy_keys(
        &subject,
        DEFAULT_BUCKET_PREFIX,
        &[AnatomyOutput::SourceModel],
        AnatomyMode::Full,
    );
    assert_eq!(keys.len(), 4);
    assert!(keys[0].as_str().ends_with("105923_MEG_anatomy_sourcemodel_2d.mat"));
}

#[test]
fn epochs_without_onsets_fail_fast() {
    let mut config = config();
    config.onsets.clear();
    assert_matches!(enumerate_keys(&config), Err(HcpError::EmptySelection(_)));
}
