//! Locating, launching and supervising the external tool.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::RunError;
use crate::result::{RunResult, Termination};

/// How often the supervisor checks the cancel flag and deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep draining output after the process has exited while a
/// descendant still holds its pipes open.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Batch or interactive invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMode {
    /// `-mode batch`: supervised, output streamed and captured.
    Batch,
    /// `-mode gui`: launched and not waited for.
    Interactive,
}

impl LaunchMode {
    /// Value passed to the tool's `-mode` option.
    pub fn as_arg(self) -> &'static str {
        match self {
            LaunchMode::Batch => "batch",
            LaunchMode::Interactive => "gui",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// The external tool executable and the policy for running it.
#[derive(Clone, Debug)]
pub struct ExternalTool {
    program: PathBuf,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl ExternalTool {
    /// A tool given as a bare command name (resolved through `PATH`) or a path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout: None,
            cancel: None,
        }
    }

    /// Arguments placed before `-mode` on every invocation.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Kill batch runs that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill batch runs once `flag` becomes `true`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The configured program name or path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolves the executable.
    pub fn locate(&self) -> Result<PathBuf, RunError> {
        which::which(&self.program).map_err(|e| {
            log::debug!("lookup of {} failed: {e}", self.program.display());
            RunError::ToolNotFound {
                program: self.program.clone(),
            }
        })
    }

    /// Runs `script` in `cwd` in the given mode.
    ///
    /// `on_line` receives each output line of a batch run; it is unused for
    /// interactive launches.
    pub fn run(
        &self,
        script: &Path,
        cwd: &Path,
        mode: LaunchMode,
        on_line: impl FnMut(&str),
    ) -> Result<RunResult, RunError> {
        match mode {
            LaunchMode::Batch => self.run_batch(script, cwd, on_line),
            LaunchMode::Interactive => self.launch_interactive(script, cwd),
        }
    }

    /// Runs `script` in batch mode and blocks until the tool exits, the
    /// timeout elapses, or the cancel flag is raised.
    pub fn run_batch(
        &self,
        script: &Path,
        cwd: &Path,
        mut on_line: impl FnMut(&str),
    ) -> Result<RunResult, RunError> {
        let exe = self.locate()?;
        if self.is_cancelled() {
            log::info!("cancelled before starting {}", exe.display());
            return Ok(RunResult::from_batch(Termination::Cancelled, String::new()));
        }
        let mut cmd = self.command(&exe, script, cwd, LaunchMode::Batch);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        log::debug!("spawning {cmd:?}");
        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: exe.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(spawn_reader(out, tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(spawn_reader(err, tx.clone()));
        }
        drop(tx);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut captured = String::new();
        let mut exited: Option<(ExitStatus, Instant)> = None;

        let termination = loop {
            if self.is_cancelled() {
                log::info!("cancelling {}", exe.display());
                kill(&mut child);
                break Termination::Cancelled;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::warn!("{} exceeded its timeout, killing it", exe.display());
                kill(&mut child);
                break Termination::TimedOut;
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    on_line(&line);
                    captured.push_str(&line);
                    captured.push('\n');
                }
                Err(RecvTimeoutError::Timeout) => match exited {
                    Some((status, at)) if at.elapsed() >= DRAIN_GRACE => {
                        break Termination::Exited(status.code());
                    }
                    Some(_) => {}
                    None => {
                        if let Some(status) = child.try_wait()? {
                            exited = Some((status, Instant::now()));
                        }
                    }
                },
                Err(RecvTimeoutError::Disconnected) => {
                    let status = match exited {
                        Some((status, _)) => status,
                        None => child.wait()?,
                    };
                    for reader in readers {
                        let _ = reader.join();
                    }
                    break Termination::Exited(status.code());
                }
            }
        };

        log::debug!("{} {termination}", exe.display());
        Ok(RunResult::from_batch(termination, captured))
    }

    /// Launches `script` in interactive mode without waiting for it.
    pub fn launch_interactive(&self, script: &Path, cwd: &Path) -> Result<RunResult, RunError> {
        let exe = self.locate()?;
        if self.is_cancelled() {
            log::info!("cancelled before launching {}", exe.display());
            return Ok(RunResult::from_batch(Termination::Cancelled, String::new()));
        }
        let mut cmd = self.command(&exe, script, cwd, LaunchMode::Interactive);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        log::debug!("launching {cmd:?}");
        let child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: exe.clone(),
            source,
        })?;
        log::info!("launched {} (pid {})", exe.display(), child.id());
        Ok(RunResult::detached())
    }

    fn command(&self, exe: &Path, script: &Path, cwd: &Path, mode: LaunchMode) -> Command {
        let mut cmd = Command::new(exe);
        cmd.args(&self.extra_args)
            .arg("-mode")
            .arg(mode.as_arg())
            .arg("-source")
            .arg(script)
            .current_dir(cwd);
        cmd
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

fn spawn_reader<R: Read + Send + 'static>(stream: R, tx: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\r', '\n']).to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("output reader stopped: {e}");
                    break;
                }
            }
        }
    })
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("kill failed: {e}");
    }
    if let Err(e) = child.wait() {
        log::debug!("wait after kill failed: {e}");
    }
}
