use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_SCHEMA_PATH: &str = "./schemas/schema.json";
pub const DEFAULT_PATTERN: &str = "*.template.yaml";
pub const DEFAULT_GENERATED_DIR: &str = "./files/generated/";

/// `RUN_MODE` value that switches discovery to the generated file list.
pub const GENERATE_RUN_MODE: &str = "generate";

/// Where the files to validate come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Walk `root` recursively, keeping files whose base name matches `pattern`.
    Pattern { root: PathBuf, pattern: String },
    /// Every entry of `dir`, non-recursive, unfiltered.
    List { dir: PathBuf },
    /// Paths given on the command line, in argument order.
    Files(Vec<PathBuf>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Parallel { jobs: NonZeroUsize },
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first error and report only that error.
    FailFast,
    /// Validate every file and report each outcome.
    KeepGoing,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub schema_path: PathBuf,
    pub source: Source,
    pub mode: Mode,
    pub policy: FailurePolicy,
}

impl Source {
    /// Directory walks run in parallel by default; explicit lists run in order.
    pub fn default_mode(&self, jobs: NonZeroUsize) -> Mode {
        match self {
            Source::Pattern { .. } => Mode::Parallel { jobs },
            Source::List { .. } | Source::Files(_) => Mode::Sequential,
        }
    }
}

pub fn default_jobs() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}
