use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command as ProcessCommand, Stdio};
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::group::{Group, GroupError};
use crate::help::{SCRIPT_NAME_WIDTH, group_help};
use crate::registry::Registry;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    Usage(String),
    #[error("Can't find group: {0}")]
    GroupNotFound(String),
    #[error("Can't find script '{script}' in group '{group}'")]
    ScriptNotFound { group: String, script: String },
    /// The script failed to start or exited unsuccessfully. `message` is the
    /// captured standard error.
    #[error("{message}")]
    Execution {
        script: PathBuf,
        exit_code: Option<i32>,
        message: String,
    },
}

/// What a successful dispatch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Listing of a group's scripts
    Help(String),
    /// Captured standard output of a script that exited successfully
    Output(String),
}

/// Interprets command-line arguments as a `(group, script)` pair against an
/// immutable [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    name_width: usize,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Dispatcher {
            registry,
            name_width: SCRIPT_NAME_WIDTH,
        }
    }

    /// Set the column width used for script names in group listings.
    #[must_use]
    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    /// `[group]` lists the group, `[group, script]` runs the script.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Usage` for any other argument count,
    /// `GroupNotFound`/`ScriptNotFound` when a name does not resolve, and
    /// `Execution` when the script cannot be started or exits non-zero.
    pub fn dispatch<S: AsRef<str>>(&self, args: &[S]) -> Result<Outcome, DispatchError> {
        match args {
            [] => Err(DispatchError::Usage("No group given".to_string())),
            [group] => self.help(group.as_ref()),
            [group, script] => self.exec(group.as_ref(), script.as_ref()),
            _ => Err(DispatchError::Usage(format!(
                "Expected a group and at most one script, got {} arguments",
                args.len()
            ))),
        }
    }

    /// Listing of a group's scripts. Never starts a process.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::GroupNotFound` if the group does not exist.
    pub fn help(&self, group_name: &str) -> Result<Outcome, DispatchError> {
        let group = self.find_group(group_name)?;
        Ok(Outcome::Help(group_help(group, self.name_width)))
    }

    /// Resolve and run a script, returning its captured standard output.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`/`ScriptNotFound` when a name does not resolve,
    /// or `Execution` carrying the script's standard error when it fails.
    pub fn exec(&self, group_name: &str, script_name: &str) -> Result<Outcome, DispatchError> {
        let group = self.find_group(group_name)?;
        let script = group
            .find_script(script_name)
            .map_err(|GroupError::ScriptNotFound(script)| DispatchError::ScriptNotFound {
                group: group.name().to_string(),
                script,
            })?;
        run_script(script).map(Outcome::Output)
    }

    fn find_group(&self, name: &str) -> Result<&'a Group, DispatchError> {
        self.registry
            .find_group(name)
            .map_err(|_| DispatchError::GroupNotFound(name.to_string()))
    }
}

/// Run a script with no arguments and no stdin, capturing its output.
fn run_script(script: &Path) -> Result<String, DispatchError> {
    info!("Executing {}", script.display());

    let start = Instant::now();
    let output = retry_busy(|| {
        ProcessCommand::new(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    });
    let duration = start.elapsed();

    match output {
        Ok(o) if o.status.success() => {
            debug!(
                "{} finished in {:.3}s",
                script.display(),
                duration.as_secs_f64()
            );
            Ok(String::from_utf8_lossy(&o.stdout).into_owned())
        }
        Ok(o) => {
            debug!("{} failed with {}", script.display(), o.status);
            Err(DispatchError::Execution {
                script: script.to_path_buf(),
                exit_code: o.status.code(),
                message: String::from_utf8_lossy(&o.stderr).into_owned(),
            })
        }
        Err(e) => Err(DispatchError::Execution {
            script: script.to_path_buf(),
            exit_code: None,
            message: e.to_string(),
        }),
    }
}

/// Attempts made while the executable is still open for writing elsewhere
const SPAWN_ATTEMPTS: u32 = 5;

/// Run `spawn`, retrying with a short backoff while it fails with
/// `ExecutableFileBusy` (a freshly written script still held open by a
/// concurrently forked process).
fn retry_busy<T>(mut spawn: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempt = 1;
    loop {
        match spawn() {
            Err(e) if e.kind() == io::ErrorKind::ExecutableFileBusy && attempt < SPAWN_ATTEMPTS => {
                debug!("Executable busy (attempt {attempt}/{SPAWN_ATTEMPTS}), retrying");
                std::thread::sleep(Duration::from_millis(10 * u64::from(attempt)));
                attempt += 1;
            }
            result => return result,
        }
    }
}
