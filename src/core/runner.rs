use crate::core::config::{FailurePolicy, Mode};
use crate::core::error::Error;
use crate::core::locator::FileTask;
use crate::core::schema::Schema;
use crate::core::validator;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Result of validating one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub task: FileTask,
    pub result: Result<(), Error>,
}

/// Aggregate of a finished run. Outcomes are in discovery order.
#[derive(Debug)]
pub struct RunReport {
    pub total: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.passed() == self.total
    }
}

/// Validates a batch of files against one shared schema.
///
/// All completion state lives inside a single `run` call, so independent
/// runners can be used side by side in one process.
pub struct Runner<'a> {
    schema: &'a Schema,
    mode: Mode,
    policy: FailurePolicy,
}

impl<'a> Runner<'a> {
    pub fn new(schema: &'a Schema, mode: Mode, policy: FailurePolicy) -> Self {
        Self {
            schema,
            mode,
            policy,
        }
    }

    /// Validate every task.
    ///
    /// Under `FailFast` the first error is returned as `Err` and no further
    /// tasks are started. Under `KeepGoing` every task runs and failures are
    /// recorded in the report.
    pub fn run(&self, tasks: Vec<FileTask>) -> Result<RunReport, Error> {
        let start = Instant::now();
        let total = tasks.len();

        let outcomes = match self.mode {
            Mode::Sequential => self.run_sequential(tasks)?,
            Mode::Parallel { jobs } => self.run_parallel(&tasks, jobs)?,
        };

        Ok(RunReport {
            total,
            elapsed: start.elapsed(),
            outcomes,
        })
    }

    fn run_sequential(&self, tasks: Vec<FileTask>) -> Result<Vec<FileOutcome>, Error> {
        let total = tasks.len();
        let mut outcomes = Vec::with_capacity(total);

        for task in tasks {
            match self.check(&task, total) {
                Err(err) if self.policy == FailurePolicy::FailFast => return Err(err),
                Err(err) => {
                    error!("FAIL {err}");
                    outcomes.push(FileOutcome {
                        task,
                        result: Err(err),
                    });
                }
                Ok(()) => outcomes.push(FileOutcome {
                    task,
                    result: Ok(()),
                }),
            }
        }
        Ok(outcomes)
    }

    /// Bounded pool of scoped workers pulling tasks from a shared cursor.
    fn run_parallel(
        &self,
        tasks: &[FileTask],
        jobs: NonZeroUsize,
    ) -> Result<Vec<FileOutcome>, Error> {
        let total = tasks.len();
        let workers = jobs.get().min(total).max(1);
        let cursor = AtomicUsize::new(0);
        let halted = AtomicBool::new(false);
        let first_failure: Mutex<Option<Error>> = Mutex::new(None);

        let mut outcomes: Vec<FileOutcome> = thread::scope(|s| {
            let (cursor, halted, first_failure) = (&cursor, &halted, &first_failure);
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(move || {
                        let mut local = Vec::new();
                        loop {
                            if halted.load(Ordering::Acquire) {
                                break;
                            }
                            let next = cursor.fetch_add(1, Ordering::Relaxed);
                            let Some(task) = tasks.get(next) else {
                                break;
                            };

                            match self.check(task, total) {
                                Err(err) if self.policy == FailurePolicy::FailFast => {
                                    halted.store(true, Ordering::Release);
                                    let mut slot = first_failure
                                        .lock()
                                        .unwrap_or_else(PoisonError::into_inner);
                                    slot.get_or_insert(err);
                                    break;
                                }
                                Err(err) => {
                                    error!("FAIL {err}");
                                    local.push(FileOutcome {
                                        task: task.clone(),
                                        result: Err(err),
                                    });
                                }
                                Ok(()) => local.push(FileOutcome {
                                    task: task.clone(),
                                    result: Ok(()),
                                }),
                            }
                        }
                        local
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(local) => local,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });

        if let Some(err) = first_failure
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(err);
        }

        outcomes.sort_by_key(|o| o.task.index);
        Ok(outcomes)
    }

    fn check(&self, task: &FileTask, total: usize) -> Result<(), Error> {
        info!(
            "Validating file {} ({} of {})",
            task.path.display(),
            task.index + 1,
            total
        );
        validator::validate_file(self.schema, &task.path)?;
        info!("PASS {}", task.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "type": "object",
        "required": ["name", "version"],
        "properties": {
            "name": { "type": "string" },
            "version": { "type": "integer" }
        }
    }"#;

    const VALID: &str = "name: web\nversion: 1\n";
    const MISSING_VERSION: &str = "name: web\n";

    fn schema() -> Schema {
        Schema::compile(Path::new("schema.json"), SCHEMA).unwrap()
    }

    fn tasks(dir: &Path, files: &[(&str, &str)]) -> Vec<FileTask> {
        files
            .iter()
            .enumerate()
            .map(|(index, (name, content))| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                FileTask { index, path }
            })
            .collect()
    }

    fn parallel(jobs: usize) -> Mode {
        Mode::Parallel {
            jobs: NonZeroUsize::new(jobs).unwrap(),
        }
    }

    #[test]
    fn sequential_all_valid_succeeds() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let batch = tasks(tmp.path(), &[("a.yaml", VALID), ("b.yaml", VALID)]);

        let report = Runner::new(&schema, Mode::Sequential, FailurePolicy::FailFast)
            .run(batch)
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.total, 2);
        assert_eq!(report.passed(), 2);
    }

    #[test]
    fn sequential_stops_at_first_violation() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let mut batch = tasks(
            tmp.path(),
            &[("a.yaml", VALID), ("b.yaml", MISSING_VERSION)],
        );
        // Never started: would surface as an Io error if it were.
        batch.push(FileTask {
            index: 2,
            path: tmp.path().join("missing.yaml"),
        });

        let err = Runner::new(&schema, Mode::Sequential, FailurePolicy::FailFast)
            .run(batch)
            .unwrap_err();
        match err {
            Error::SchemaViolation { path, .. } => assert_eq!(path, tmp.path().join("b.yaml")),
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn sequential_keep_going_reports_every_file() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let mut batch = tasks(
            tmp.path(),
            &[("a.yaml", MISSING_VERSION), ("b.yaml", VALID)],
        );
        batch.push(FileTask {
            index: 2,
            path: tmp.path().join("missing.yaml"),
        });

        let report = Runner::new(&schema, Mode::Sequential, FailurePolicy::KeepGoing)
            .run(batch)
            .unwrap();
        assert!(!report.is_success());
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.passed(), 1);
        let failed: Vec<usize> = report.failures().map(|o| o.task.index).collect();
        assert_eq!(failed, vec![0, 2]);
        assert!(matches!(
            report.outcomes[2].result,
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn parallel_all_valid_keeps_discovery_order() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let names: Vec<String> = (0..12).map(|i| format!("f{i:02}.yaml")).collect();
        let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), VALID)).collect();
        let batch = tasks(tmp.path(), &files);

        let report = Runner::new(&schema, parallel(4), FailurePolicy::FailFast)
            .run(batch)
            .unwrap();
        assert!(report.is_success());
        let order: Vec<usize> = report.outcomes.iter().map(|o| o.task.index).collect();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn parallel_malformed_yaml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let batch = tasks(
            tmp.path(),
            &[
                ("a.yaml", VALID),
                ("b.yaml", "name: [unterminated"),
                ("c.yaml", VALID),
            ],
        );

        let err = Runner::new(&schema, parallel(2), FailurePolicy::FailFast)
            .run(batch)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }

    #[test]
    fn parallel_stops_claiming_tasks_after_failure() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let mut batch = tasks(tmp.path(), &[("a.yaml", MISSING_VERSION)]);
        // Never claimed: would surface as an Io error if it were.
        batch.push(FileTask {
            index: 1,
            path: tmp.path().join("missing.yaml"),
        });

        let err = Runner::new(&schema, parallel(1), FailurePolicy::FailFast)
            .run(batch)
            .unwrap_err();
        match err {
            Error::SchemaViolation { path, .. } => assert_eq!(path, tmp.path().join("a.yaml")),
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn merged_document_passes() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let batch = tasks(
            tmp.path(),
            &[(
                "merged.yaml",
                "defaults: &d\n  version: 3\n<<: *d\nname: web\n",
            )],
        );

        let report = Runner::new(&schema, Mode::Sequential, FailurePolicy::FailFast)
            .run(batch)
            .unwrap();
        assert!(report.is_success());
    }

    #[test]
    fn parallel_keep_going_collects_failures() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let batch = tasks(
            tmp.path(),
            &[
                ("a.yaml", VALID),
                ("b.yaml", MISSING_VERSION),
                ("c.yaml", VALID),
                ("d.yaml", "version: nope\n"),
            ],
        );

        let report = Runner::new(&schema, parallel(3), FailurePolicy::KeepGoing)
            .run(batch)
            .unwrap();
        assert_eq!(report.passed(), 2);
        let failed: Vec<PathBuf> = report.failures().map(|o| o.task.path.clone()).collect();
        assert_eq!(
            failed,
            vec![tmp.path().join("b.yaml"), tmp.path().join("d.yaml")]
        );
    }

    #[test]
    fn more_jobs_than_tasks_is_fine() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let batch = tasks(tmp.path(), &[("a.yaml", VALID)]);

        let report = Runner::new(&schema, parallel(64), FailurePolicy::FailFast)
            .run(batch)
            .unwrap();
        assert_eq!(report.passed(), 1);
    }

    #[test]
    fn independent_runs_share_one_schema() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();
        let good = tasks(tmp.path(), &[("a.yaml", VALID), ("b.yaml", VALID)]);
        let bad = tasks(tmp.path(), &[("c.yaml", MISSING_VERSION)]);

        let (good, bad) = thread::scope(|s| {
            let g = s.spawn(|| {
                Runner::new(&schema, parallel(2), FailurePolicy::FailFast).run(good)
            });
            let b = s.spawn(|| {
                Runner::new(&schema, parallel(2), FailurePolicy::FailFast).run(bad)
            });
            (g.join().unwrap(), b.join().unwrap())
        });
        assert!(good.unwrap().is_success());
        assert!(matches!(bad, Err(Error::SchemaViolation { .. })));
    }
}
