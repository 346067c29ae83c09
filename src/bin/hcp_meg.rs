use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hcp_meg_fetch::app::{App, FetchOptions};
use hcp_meg_fetch::config::{
    Config, ConfigLoader, FetchConfig, ResolvedConfig, run_limit_from_env,
};
use hcp_meg_fetch::domain::{
    AnatomyMode, AnatomyOutput, DataType, Onset, OutputKind, RemoteKey, SensorMode, Subject,
};
use hcp_meg_fetch::error::HcpError;
use hcp_meg_fetch::file_mapping::MegFileQuery;
use hcp_meg_fetch::output::{JsonOutput, OutputMode, TextOutput};
use hcp_meg_fetch::remote::{RemoteClient, S3HttpClient};
use hcp_meg_fetch::store::Store;

#[derive(Parser)]
#[command(name = "hcp-meg")]
#[command(about = "Resolve and download Human Connectome Project MEG data")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List the remote keys making up a subject's dataset")]
    Keys(SelectionArgs),
    #[command(about = "Show local paths of one data type / output / run combination")]
    Paths(PathsArgs),
    #[command(about = "Report which keys are already present locally")]
    Status(SelectionArgs),
    #[command(about = "Download missing keys into the local HCP tree")]
    Fetch(FetchArgs),
}

#[derive(Args, Clone)]
struct StoreArgs {
    #[arg(long, help = "Config file (default: ./hcp-meg.json when present)")]
    config: Option<String>,

    #[arg(long)]
    subject: Option<Subject>,

    #[arg(long, help = "Local HCP root (default: ~/mne-hcp-data/HCP)")]
    hcp_path: Option<Utf8PathBuf>,
}

#[derive(Args, Clone)]
struct SelectionArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long, help = "Bucket prefix, e.g. s3://hcp-openaccess/HCP_900")]
    prefix: Option<String>,

    #[arg(long = "data-type")]
    data_types: Vec<DataType>,

    #[arg(long = "output")]
    outputs: Vec<OutputKind>,

    #[arg(long = "onset")]
    onsets: Vec<Onset>,

    #[arg(long = "sensor-mode")]
    sensor_modes: Vec<SensorMode>,

    #[arg(long = "anatomy")]
    anatomy_outputs: Vec<AnatomyOutput>,

    #[arg(long)]
    anatomy_mode: Option<AnatomyMode>,

    #[arg(long, help = "Number of runs per session (default: MNE_HCP_N_RUNS or 3)")]
    runs: Option<usize>,
}

#[derive(Args, Clone)]
struct PathsArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long)]
    data_type: DataType,

    #[arg(long)]
    output: OutputKind,

    #[arg(long, default_value_t = 0)]
    run_index: usize,

    #[arg(long, default_value = "stim")]
    onset: Onset,

    #[arg(long, default_value = "mag")]
    sensor_mode: SensorMode,
}

#[derive(Args, Clone)]
struct FetchArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    #[arg(long)]
    force: bool,

    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<HcpError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HcpError) -> u8 {
    match error {
        HcpError::MissingConfig
        | HcpError::ConfigRead(_)
        | HcpError::InvalidSubject(_)
        | HcpError::UnknownDataType(_)
        | HcpError::UnknownOutput(_)
        | HcpError::UnknownOnset(_)
        | HcpError::UnknownSensorMode(_)
        | HcpError::UnknownAnatomyOutput(_)
        | HcpError::UnknownAnatomyMode(_)
        | HcpError::InvalidRunLimit(_)
        | HcpError::EmptySelection(_)
        | HcpError::InvalidBucketPrefix(_)
        | HcpError::RunIndexOutOfRange { .. }
        | HcpError::RunIndexAboveMax(_)
        | HcpError::OutputUnavailable { .. }
        | HcpError::OnsetUnavailable { .. } => 2,
        HcpError::RemoteHttp(_) | HcpError::RemoteStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Commands::Keys(args) => {
            let (config, store) = resolve_selection(&args)?;
            let app = App::new(store, NopRemote);
            let result = app.plan(&config)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_plan(&result).into_diagnostic(),
                OutputMode::Text => TextOutput::print_plan(&result).into_diagnostic(),
            }
        }
        Commands::Paths(args) => {
            let resolved = load_config(args.store.config.as_deref(), run_limit_from_env()?)?;
            let store = resolve_store(&args.store, &resolved)?;
            let subject = args
                .store
                .subject
                .clone()
                .unwrap_or_else(|| resolved.fetch.subject.clone());
            let query = MegFileQuery::new(&subject, args.data_type, args.output)
                .run_index(args.run_index)
                .onset(args.onset)
                .sensor_mode(args.sensor_mode);
            let app = App::new(store, NopRemote);
            let result = app.paths(&query)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_paths(&result).into_diagnostic(),
                OutputMode::Text => TextOutput::print_paths(&result).into_diagnostic(),
            }
        }
        Commands::Status(args) => {
            let (config, store) = resolve_selection(&args)?;
            let app = App::new(store, NopRemote);
            match output_mode {
                OutputMode::Json => {
                    let result = app.status(&config, &JsonOutput)?;
                    JsonOutput::print_status(&result).into_diagnostic()
                }
                OutputMode::Text => {
                    let result = app.status(&config, &TextOutput)?;
                    TextOutput::print_status(&result).into_diagnostic()
                }
            }
        }
        Commands::Fetch(args) => {
            let (config, store) = resolve_selection(&args.selection)?;
            let app = App::new(store, S3HttpClient::new()?);
            let options = FetchOptions {
                force: args.force,
                dry_run: args.dry_run,
            };
            match output_mode {
                OutputMode::Json => {
                    let result = app.fetch(&config, options, &JsonOutput)?;
                    JsonOutput::print_fetch(&result).into_diagnostic()
                }
                OutputMode::Text => {
                    let result = app.fetch(&config, options, &TextOutput)?;
                    TextOutput::print_fetch(&result).into_diagnostic()
                }
            }
        }
    }
}

fn load_config(path: Option<&str>, run_limit: usize) -> Result<ResolvedConfig, HcpError> {
    match ConfigLoader::resolve(path, run_limit) {
        Err(HcpError::MissingConfig) => {
            debug!("no config file, using defaults");
            ConfigLoader::resolve_config(Config::default(), run_limit)
        }
        other => other,
    }
}

fn resolve_store(args: &StoreArgs, resolved: &ResolvedConfig) -> miette::Result<Store> {
    match args.hcp_path.clone().or_else(|| resolved.hcp_path.clone()) {
        Some(root) => Ok(Store::new_with_root(root)),
        None => Ok(Store::new()?),
    }
}

fn resolve_selection(args: &SelectionArgs) -> miette::Result<(FetchConfig, Store)> {
    let run_limit = match args.runs {
        Some(limit) => limit,
        None => run_limit_from_env()?,
    };
    let resolved = load_config(args.store.config.as_deref(), run_limit)?;
    let store = resolve_store(&args.store, &resolved)?;

    let mut config = resolved.fetch;
    if let Some(subject) = &args.store.subject {
        config.subject = subject.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.bucket_prefix = prefix.clone();
    }
    if !args.data_types.is_empty() {
        config.data_types = args.data_types.clone();
    }
    if !args.outputs.is_empty() {
        config.outputs = args.outputs.clone();
    }
    if !args.onsets.is_empty() {
        config.onsets = args.onsets.clone();
    }
    if !args.sensor_modes.is_empty() {
        config.sensor_modes = args.sensor_modes.clone();
    }
    if !args.anatomy_outputs.is_empty() {
        config.anatomy_outputs = args.anatomy_outputs.clone();
    }
    if let Some(mode) = args.anatomy_mode {
        config.anatomy_mode = mode;
    }
    Ok((config, store))
}

struct NopRemote;

impl RemoteClient for NopRemote {
    fn download(
        &self,
        _key: &RemoteKey,
        _destination: &mut std::fs::File,
    ) -> Result<u64, HcpError> {
        Err(HcpError::RemoteHttp(
            "remote client not configured".to_string(),
        ))
    }
}
