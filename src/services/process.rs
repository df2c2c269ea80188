use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// What to start and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Command line as a person would type it, for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Starts game servers and clients.
#[allow(async_fn_in_trait)]
pub trait ProcessLauncher {
    /// Starts the program and forgets about it.
    fn start_detached(&self, spec: &LaunchSpec) -> Result<()>;

    /// Starts the program and resolves once it exits. A non-zero exit code is
    /// not an error; the server stopping is all that matters.
    async fn run_until_exit(&self, spec: &LaunchSpec) -> Result<()>;
}

#[derive(Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl ProcessLauncher for TokioProcessLauncher {
    fn start_detached(&self, spec: &LaunchSpec) -> Result<()> {
        let mut cmd = spec.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.spawn()
            .map_err(|e| Error::Process(format!("failed to start {}: {}", spec.display(), e)))?;
        Ok(())
    }

    async fn run_until_exit(&self, spec: &LaunchSpec) -> Result<()> {
        let mut child = spec
            .command()
            .spawn()
            .map_err(|e| Error::Process(format!("failed to start {}: {}", spec.display(), e)))?;

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Process(format!("failed waiting for {}: {}", spec.display(), e)))?;
        if !status.success() {
            log::warn!("{} exited with {}", spec.display(), status);
        }
        Ok(())
    }
}
