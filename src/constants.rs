use crate::domain::DataType;

pub const DEFAULT_BUCKET_PREFIX: &str = "s3://hcp-openaccess/HCP_900";
pub const DEFAULT_SUBJECT: &str = "105923";

pub const RUN_LIMIT_ENV: &str = "MNE_HCP_N_RUNS";
pub const DEFAULT_RUN_LIMIT: usize = 3;
pub const RUN_INDICES: [usize; 3] = [0, 1, 2];

pub const N_MEG_CHANNELS: usize = 248;
pub const MEG_CHANNEL_PREFIX: char = 'A';

pub const SFREQ_RAW: f64 = 2034.5101;
pub const SFREQ_PREPROC: f64 = 508.63;

pub const CONTINUOUS_EVENT_CODE: i64 = 99;

pub const BOUNDS_TOLERANCE: f64 = 0.01;

pub fn epoch_bounds(data_type: DataType) -> Option<(f64, f64)> {
    match data_type {
        DataType::TaskMotor => Some((-1.2, 1.2)),
        DataType::TaskWorkingMemory => Some((-1.5, 2.5)),
        DataType::TaskStoryMath => Some((-1.5, 4.0)),
        DataType::Rest => Some((0.0, 2.0)),
        DataType::NoiseEmptyRoom => None,
    }
}

pub fn extra_channels(data_type: DataType) -> usize {
    match data_type {
        DataType::TaskMotor => 4,
        DataType::Rest
        | DataType::TaskStoryMath
        | DataType::TaskWorkingMemory
        | DataType::NoiseEmptyRoom => 0,
    }
}

pub fn evoked_conditions(data_type: DataType) -> &'static [&'static str] {
    match data_type {
        DataType::TaskMotor => &[
            "LM-TEMG-LF",
            "LM-TEMG-LH",
            "LM-TEMG-RF",
            "LM-TEMG-RH",
            "LM-TFLA-LF",
            "LM-TFLA-LH",
            "LM-TFLA-RF",
            "LM-TFLA-RH",
        ],
        DataType::TaskWorkingMemory => &[
            "LM-TIM-0B",
            "LM-TIM-2B",
            "LM-TIM-face",
            "LM-TIM-tool",
            "LM-TIM-0B-versus-2B",
            "LM-TIM-face-versus-tool",
        ],
        DataType::TaskStoryMath => &[
            "LM-TEV-mathnumopt",
            "LM-TEV-mathoper",
            "LM-TEV-storoptcor",
            "LM-TEV-storoptincor",
            "LM-BSENT-story",
            "LM-BSENT-math",
        ],
        DataType::Rest | DataType::NoiseEmptyRoom => &[],
    }
}

pub const EVOKED_DIFF_MODE: &str = "BT-diff";

pub const RAW_FILES: [&str; 5] = [
    "c,rfDC",
    "config",
    "hs_file",
    "e,rfhp1.0Hz,COH",
    "e,rfhp1.0Hz,COH1",
];

pub const BADS_SUFFIXES: [&str; 4] = [
    "badchannels",
    "badsegments",
    "manual_badchannels",
    "manual_badsegments",
];

pub const ICA_FILES: [&str; 4] = [
    "icaclass_vs.mat",
    "icaclass_vs.txt",
    "icaclass.mat",
    "icaclass.txt",
];

pub const FREESURFER_MINIMAL_LABEL: [&str; 4] = [
    "lh.aparc.annot",
    "rh.aparc.annot",
    "lh.aparc.a2009s.annot",
    "rh.aparc.a2009s.annot",
];

pub const FREESURFER_MINIMAL_MRI: [&str; 5] = [
    "T1.mgz",
    "brain.mgz",
    "aseg.mgz",
    "orig.mgz",
    "transforms/talairach.xfm",
];

pub const FREESURFER_MINIMAL_SURF: [&str; 10] = [
    "lh.white",
    "rh.white",
    "lh.pial",
    "rh.pial",
    "lh.inflated",
    "rh.inflated",
    "lh.sphere.reg",
    "rh.sphere.reg",
    "lh.curv",
    "rh.curv",
];

pub const FREESURFER_EXTRA_LABEL: [&str; 4] = [
    "lh.BA.annot",
    "rh.BA.annot",
    "lh.aparc.DKTatlas40.annot",
    "rh.aparc.DKTatlas40.annot",
];

pub const FREESURFER_EXTRA_MRI: [&str; 4] = ["aparc+aseg.mgz", "norm.mgz", "wm.mgz", "nu.mgz"];

pub const FREESURFER_EXTRA_SURF: [&str; 8] = [
    "lh.sphere",
    "rh.sphere",
    "lh.smoothwm",
    "rh.smoothwm",
    "lh.sulc",
    "rh.sulc",
    "lh.thickness",
    "rh.thickness",
];

pub const SOURCE_MODELS: [&str; 4] = ["2d", "3d4mm", "3d6mm", "3d8mm"];
