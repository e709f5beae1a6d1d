//! Minimization by an external program.
//!
//! The program gets the formula on stdin, followed by a newline, and
//! answers on stdout with the minimized formula, `0` for a contradiction,
//! or `1` (or nothing) for a tautology.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded};

use super::{Minimized, Minimizer};
use crate::error::{OptimizeError, Result};

/// Runs an external minimizer once per formula.
///
/// On timeout only the direct child is killed. Descendants it started keep
/// running, and the pipe reader threads stay parked until the last process
/// holding the pipes exits. The caller is not blocked by them. Programs that
/// fork should `exec` or clean up their own children.
#[derive(Debug, Clone)]
pub struct ProcessMinimizer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

struct Output {
    stdout: String,
    stderr: String,
}

impl ProcessMinimizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn failure(&self, message: impl std::fmt::Display) -> OptimizeError {
        OptimizeError::MinimizerFailure(format!("{}: {}", self.program.display(), message))
    }
}

impl Minimizer for ProcessMinimizer {
    fn name(&self) -> &'static str {
        "process"
    }

    fn minimize(&self, formula: &str) -> Result<Minimized> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.failure(format!("failed to start: {}", err)))?;

        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(self.failure("missing stdio pipes"));
        };

        let input = format!("{}\n", formula);
        let (tx, rx) = bounded::<std::io::Result<Output>>(1);
        thread::spawn(move || {
            let errors = thread::spawn(move || -> std::io::Result<String> {
                let mut text = String::new();
                stderr.read_to_string(&mut text)?;
                Ok(text)
            });
            let result = (|| -> std::io::Result<Output> {
                stdin.write_all(input.as_bytes())?;
                drop(stdin);
                let mut text = String::new();
                stdout.read_to_string(&mut text)?;
                let stderr = errors
                    .join()
                    .map_err(|_| std::io::Error::other("stderr reader panicked"))??;
                Ok(Output {
                    stdout: text,
                    stderr,
                })
            })();
            // The receiver is gone after a timeout.
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(self.timeout) {
            Ok(result) => result.map_err(|err| self.failure(err))?,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Minimizer {} timed out after {:?}, killing it",
                    self.program.display(),
                    self.timeout
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(OptimizeError::MinimizerTimeout(self.timeout));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.failure("reader thread exited"));
            }
        };

        let status = child.wait().map_err(|err| self.failure(err))?;
        if !status.success() {
            return Err(self.failure(format!("exited with {}", status)));
        }
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            return Err(self.failure(stderr));
        }

        Ok(match output.stdout.trim() {
            "0" => Minimized::Contradiction,
            "" | "1" => Minimized::Tautology,
            formula => Minimized::Expression(formula.to_string()),
        })
    }
}
