use crate::core::config::{self, FailurePolicy, Mode, Settings, Source};
use crate::core::error::Error;
use crate::core::locator;
use crate::core::runner::{RunReport, Runner};
use crate::core::schema::Schema;
use clap::{Args, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory to search for templates, or explicit files to validate
    pub paths: Vec<PathBuf>,

    /// Glob matched against file names when walking a directory
    #[arg(long, default_value = config::DEFAULT_PATTERN)]
    pub pattern: String,

    /// JSON Schema every document is validated against
    #[arg(long, env = "SCHEMA_PATH", default_value = config::DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,

    /// Set to `generate` to validate the generated file list instead of PATHS
    #[arg(long, env = "RUN_MODE")]
    pub run_mode: Option<String>,

    /// Directory holding the generated file list
    #[arg(long, default_value = config::DEFAULT_GENERATED_DIR)]
    pub generated_dir: PathBuf,

    /// Scheduling: directories run in parallel and file lists in order by default
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    /// Maximum number of files validated at once in parallel mode
    #[arg(long, short)]
    pub jobs: Option<NonZeroUsize>,

    /// Validate every file and report all failures instead of stopping at the first
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Auto,
    Parallel,
    Sequential,
}

/// Turn parsed arguments into settings, choosing the discovery source.
///
/// `RUN_MODE=generate` wins over path arguments. Otherwise a single argument
/// that is a directory, or does not exist at all, is walked for the pattern
/// (so a mistyped root is a discovery error) and anything else is a file list.
pub fn settings(args: &ValidateArgs) -> Result<Settings, Error> {
    let generate = match args.run_mode.as_deref() {
        Some(config::GENERATE_RUN_MODE) => true,
        Some(other) if !other.is_empty() => {
            warn!("ignoring unknown RUN_MODE {other:?}");
            false
        }
        _ => false,
    };

    let source = if generate {
        if !args.paths.is_empty() {
            debug!("RUN_MODE=generate: ignoring {} path argument(s)", args.paths.len());
        }
        Source::List {
            dir: args.generated_dir.clone(),
        }
    } else {
        match args.paths.as_slice() {
            [] => {
                return Err(Error::Config(
                    "Please provide a path of where the files are located".to_string(),
                ));
            }
            [dir] if dir.is_dir() || !dir.exists() => Source::Pattern {
                root: dir.clone(),
                pattern: args.pattern.clone(),
            },
            files => Source::Files(files.to_vec()),
        }
    };

    let jobs = args.jobs.unwrap_or_else(config::default_jobs);
    let mode = match args.mode {
        ModeArg::Auto => source.default_mode(jobs),
        ModeArg::Parallel => Mode::Parallel { jobs },
        ModeArg::Sequential => Mode::Sequential,
    };
    let policy = if args.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };

    Ok(Settings {
        schema_path: args.schema.clone(),
        source,
        mode,
        policy,
    })
}

fn execute(args: &ValidateArgs) -> Result<RunReport, Error> {
    let settings = settings(args)?;
    debug!(?settings, "resolved settings");

    let tasks = locator::locate(&settings.source)?;
    if tasks.is_empty() {
        return Err(Error::Config("No files found".to_string()));
    }

    let schema = Schema::load(&settings.schema_path)?;
    debug!(
        schema = %schema.path().display(),
        id = schema.id().unwrap_or("-"),
        "schema compiled"
    );
    Runner::new(&schema, settings.mode, settings.policy).run(tasks)
}

pub fn run(args: ValidateArgs) -> i32 {
    let report = match execute(&args) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    let exit_code = if report.is_success() {
        info!("All files are valid");
        0
    } else {
        error!(
            "{} of {} files are valid",
            report.passed(),
            report.total
        );
        for outcome in report.failures() {
            error!("  failed: {}", outcome.task.path.display());
        }
        1
    };
    info!(
        "Total time taken to validate {} files: {} seconds",
        report.total,
        report.elapsed.as_secs_f64()
    );
    exit_code
}
