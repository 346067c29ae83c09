use crate::constants::{
    BADS_SUFFIXES, EVOKED_DIFF_MODE, FREESURFER_EXTRA_LABEL, FREESURFER_EXTRA_MRI,
    FREESURFER_EXTRA_SURF, FREESURFER_MINIMAL_LABEL, FREESURFER_MINIMAL_MRI,
    FREESURFER_MINIMAL_SURF, ICA_FILES, RAW_FILES, SOURCE_MODELS, evoked_conditions,
};
use crate::domain::{AnatomyMode, AnatomyOutput, DataType, Onset, OutputKind, SensorMode, Subject};
use crate::error::HcpError;

#[derive(Debug, Clone, Copy)]
pub struct MegFileQuery<'a> {
    pub subject: &'a Subject,
    pub data_type: DataType,
    pub output: OutputKind,
    pub run_index: usize,
    pub onset: Onset,
    pub sensor_mode: SensorMode,
}

impl<'a> MegFileQuery<'a> {
    pub fn new(subject: &'a Subject, data_type: DataType, output: OutputKind) -> Self {
        Self {
            subject,
            data_type,
            output,
            run_index: 0,
            onset: Onset::Stim,
            sensor_mode: SensorMode::default(),
        }
    }

    pub fn run_index(mut self, run_index: usize) -> Self {
        self.run_index = run_index;
        self
    }

    pub fn onset(mut self, onset: Onset) -> Self {
        self.onset = onset;
        self
    }

    pub fn sensor_mode(mut self, sensor_mode: SensorMode) -> Self {
        self.sensor_mode = sensor_mode;
        self
    }
}

pub fn run_label(data_type: DataType, run_index: usize) -> Result<&'static str, HcpError> {
    data_type
        .run_labels()
        .get(run_index)
        .copied()
        .ok_or_else(|| HcpError::RunIndexOutOfRange {
            data_type: data_type.to_string(),
            runs: data_type.n_runs(),
            run_index,
        })
}

pub fn meg_file_paths(query: &MegFileQuery<'_>) -> Result<Vec<String>, HcpError> {
    let MegFileQuery {
        subject,
        data_type,
        output,
        run_index,
        onset,
        sensor_mode,
    } = *query;

    if !output.applies_to(data_type) {
        return Err(HcpError::OutputUnavailable {
            data_type: data_type.to_string(),
            output: output.to_string(),
        });
    }

    let kind = data_type.kind_label();
    let meg_dir = |pipeline: &str| format!("{subject}/MEG/{kind}/{pipeline}");

    if output == OutputKind::Evoked {
        let dir = meg_dir("eravg");
        return Ok(evoked_conditions(data_type)
            .iter()
            .map(|condition| {
                format!(
                    "{dir}/{subject}_MEG_{kind}_eravg_[{condition}]_[{EVOKED_DIFF_MODE}]_[{}].mat",
                    sensor_mode.label()
                )
            })
            .collect());
    }

    let run = run_label(data_type, run_index)?;
    let stem = format!("{subject}_MEG_{run}-{kind}");

    let files = match output {
        OutputKind::Raw => {
            let dir = format!("{subject}/unprocessed/MEG/{run}-{kind}/4D");
            RAW_FILES
                .iter()
                .map(|name| format!("{dir}/{name}"))
                .collect()
        }
        OutputKind::Epochs if data_type.is_rest() => {
            let pipeline = format!("{}preproc", data_type.context());
            vec![format!("{}/{stem}_{pipeline}.mat", meg_dir(&pipeline))]
        }
        OutputKind::Epochs => {
            let token = onset
                .label(data_type)
                .ok_or_else(|| HcpError::OnsetUnavailable {
                    data_type: data_type.to_string(),
                    onset: onset.to_string(),
                })?;
            vec![format!(
                "{}/{stem}_tmegpreproc_{token}.mat",
                meg_dir("tmegpreproc")
            )]
        }
        OutputKind::TrialInfo => vec![format!(
            "{}/{stem}_tmegpreproc_trialinfo.mat",
            meg_dir("tmegpreproc")
        )],
        OutputKind::Ica => {
            let dir = meg_dir("icaclass");
            ICA_FILES
                .iter()
                .map(|name| format!("{dir}/{stem}_{name}"))
                .collect()
        }
        OutputKind::Bads => {
            let dir = meg_dir("baddata");
            BADS_SUFFIXES
                .iter()
                .map(|suffix| format!("{dir}/{stem}_baddata_{suffix}.txt"))
                .collect()
        }
        OutputKind::Evoked => unreachable!("evoked handled above"),
    };
    Ok(files)
}

pub fn anatomy_file_paths(
    subject: &Subject,
    output: AnatomyOutput,
    mode: AnatomyMode,
) -> Vec<String> {
    let meg_anatomy = format!("{subject}/MEG/anatomy");
    let freesurfer = |names: &[&str], extra: &[&str]| {
        let dir = format!("{subject}/T1w/{subject}/{output}");
        let extra = match mode {
            AnatomyMode::Minimal => &[][..],
            AnatomyMode::Full => extra,
        };
        names
            .iter()
            .chain(extra.iter())
            .map(|name| format!("{dir}/{name}"))
            .collect::<Vec<_>>()
    };

    match output {
        AnatomyOutput::Label => freesurfer(&FREESURFER_MINIMAL_LABEL, &FREESURFER_EXTRA_LABEL),
        AnatomyOutput::Mri => freesurfer(&FREESURFER_MINIMAL_MRI, &FREESURFER_EXTRA_MRI),
        AnatomyOutput::Surf => freesurfer(&FREESURFER_MINIMAL_SURF, &FREESURFER_EXTRA_SURF),
        AnatomyOutput::HeadModel => {
            vec![format!("{meg_anatomy}/{subject}_MEG_anatomy_headmodel.mat")]
        }
        AnatomyOutput::Transforms => {
            vec![format!("{meg_anatomy}/{subject}_MEG_anatomy_transform.txt")]
        }
        AnatomyOutput::SourceModel => SOURCE_MODELS
            .iter()
            .map(|model| format!("{meg_anatomy}/{subject}_MEG_anatomy_sourcemodel_{model}.mat"))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn subject() -> Subject {
        "105923".parse().unwrap()
    }

    #[test]
    fn raw_files_for_first_rest_run() {
        let subject = subject();
        let files =
            meg_file_paths(&MegFileQuery::new(&subject, DataType::Rest, OutputKind::Raw)).unwrap();
        assert_eq!(files.len(), RAW_FILES.len());
        assert_eq!(files[0], "105923/unprocessed/MEG/3-Restin/4D/c,rfDC");
    }

    #[test]
    fn rest_epochs_ignore_onset() {
        let subject = subject();
        let query = MegFileQuery::new(&subject, DataType::Rest, OutputKind::Epochs)
            .run_index(2)
            .onset(Onset::Resp);
        assert_eq!(
            meg_file_paths(&query).unwrap(),
            vec!["105923/MEG/Restin/rmegpreproc/105923_MEG_5-Restin_rmegpreproc.mat"]
        );
    }

    #[test]
    fn task_epochs_use_onset_token() {
        let subject = subject();
        let query = MegFileQuery::new(&subject, DataType::TaskWorkingMemory, OutputKind::Epochs)
            .run_index(1);
        assert_eq!(
            meg_file_paths(&query).unwrap(),
            vec!["105923/MEG/Wrkmem/tmegpreproc/105923_MEG_7-Wrkmem_tmegpreproc_TIM.mat"]
        );
    }

    #[test]
    fn motor_has_no_response_onset() {
        let subject = subject();
        let query = MegFileQuery::new(&subject, DataType::TaskMotor, OutputKind::Epochs)
            .onset(Onset::Resp);
        assert_matches!(
            meg_file_paths(&query),
            Err(HcpError::OnsetUnavailable { .. })
        );
    }

    #[test]
    fn out_of_range_run_is_rejected() {
        let subject = subject();
        let query =
            MegFileQuery::new(&subject, DataType::TaskMotor, OutputKind::Raw).run_index(2);
        assert_matches!(
            meg_file_paths(&query),
            Err(HcpError::RunIndexOutOfRange { runs: 2, run_index: 2, .. })
        );
    }

    #[test]
    fn noise_has_no_trial_info() {
        let subject = subject();
        let query = MegFileQuery::new(&subject, DataType::NoiseEmptyRoom, OutputKind::TrialInfo);
        assert_matches!(
            meg_file_paths(&query),
            Err(HcpError::OutputUnavailable { .. })
        );
    }

    #[test]
    fn evoked_lists_one_file_per_condition() {
        let subject = subject();
        let query = MegFileQuery::new(&subject, DataType::TaskMotor, OutputKind::Evoked)
            .sensor_mode(SensorMode::Planar);
        let files = meg_file_paths(&query).unwrap();
        assert_eq!(files.len(), evoked_conditions(DataType::TaskMotor).len());
        assert_eq!(
            files[0],
            "105923/MEG/Motort/eravg/105923_MEG_Motort_eravg_[LM-TEMG-LF]_[BT-diff]_[MODE-planar].mat"
        );
    }

    #[test]
    fn full_anatomy_extends_minimal() {
        let subject = subject();
        let minimal = anatomy_file_paths(&subject, AnatomyOutput::Surf, AnatomyMode::Minimal);
        let full = anatomy_file_paths(&subject, AnatomyOutput::Surf, AnatomyMode::Full);
        assert!(minimal.iter().all(|path| full.contains(path)));
        assert!(full.len() > minimal.len());
        assert_eq!(minimal[0], "105923/T1w/105923/surf/lh.white");
    }
}
