//! Game process lifecycle around the shared save.
//!
//! A server run is bracketed by `load` and `save`: the lock is taken and the
//! save pulled before the server starts, and pushed back once it exits.

use crate::domain::save::{GameSave, OrchestratorResult, Session};
use crate::error::{Error, Result};
use crate::lock::LockManager;
use crate::orchestrator::SharedSave;
use crate::services::process::{LaunchSpec, ProcessLauncher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerParameters {
    pub path: PathBuf,
    #[serde(default)]
    pub arguments: Option<String>,
}

impl ServerParameters {
    fn launch_spec(&self) -> LaunchSpec {
        let args = self
            .arguments
            .as_deref()
            .map(|a| a.split_whitespace().collect::<Vec<_>>())
            .unwrap_or_default();
        let spec = LaunchSpec::new(&self.path).args(args);
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => spec.working_dir(dir),
            _ => spec,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParameters {
    pub path: PathBuf,
}

pub struct ServerSession<O: SharedSave + Send + Sync + 'static, P: ProcessLauncher> {
    orchestrator: Arc<O>,
    launcher: P,
}

impl<O: SharedSave + Send + Sync + 'static, P: ProcessLauncher> ServerSession<O, P> {
    pub fn new(orchestrator: O, launcher: P) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            launcher,
        }
    }

    /// Runs `load` on the blocking pool; it copies whole save folders.
    pub async fn load(&self, game_save: &GameSave, session: &Session) -> Result<OrchestratorResult> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let game_save = game_save.clone();
        let session = session.clone();
        tokio::task::spawn_blocking(move || orchestrator.load(&game_save, &session))
            .await
            .map_err(|e| Error::Task(format!("load: {}", e)))
    }

    pub async fn save(&self, game_save: &GameSave, session: &Session) -> Result<()> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let game_save = game_save.clone();
        let session = session.clone();
        tokio::task::spawn_blocking(move || orchestrator.save(&game_save, &session))
            .await
            .map_err(|e| Error::Task(format!("save: {}", e)))
    }

    /// Loads the save, runs the server until it exits, then saves. Nothing is
    /// started unless the load succeeded.
    pub async fn run_server_with_auto_save(
        &self,
        game_save: &GameSave,
        session: &Session,
        server: &ServerParameters,
    ) -> Result<()> {
        if server.path.as_os_str().is_empty() {
            return Err(Error::Process(
                "no server path provided, cannot start a gaming session".to_string(),
            ));
        }

        if self.load(game_save, session).await? != OrchestratorResult::Loaded {
            return Ok(());
        }

        let spec = server.launch_spec();
        log::info!("Server started, waiting for exit: \"{}\"", spec.display());
        let ran = self.launcher.run_until_exit(&spec).await;
        match &ran {
            Ok(()) => log::info!("Server exited"),
            Err(e) => log::error!("Server run failed: {}", e),
        }

        // The lock is ours now, so it is given back even if the server never ran.
        self.save(game_save, session).await?;
        ran
    }
}

pub struct ClientSession<P: ProcessLauncher> {
    launcher: P,
}

impl<P: ProcessLauncher> ClientSession<P> {
    pub fn new(launcher: P) -> Self {
        Self { launcher }
    }

    /// Starts the game client pointed at `session`'s server.
    pub fn run_client(&self, session: &Session, client: &ClientParameters) -> Result<()> {
        if client.path.as_os_str().is_empty() {
            return Err(Error::Process(
                "no client path provided, cannot start a client session".to_string(),
            ));
        }

        let spec = LaunchSpec::new(&client.path).args(["+connect".to_string(), session.endpoint()]);
        self.launcher.start_detached(&spec)?;
        log::info!("Client started: \"{}\"", spec.display());
        Ok(())
    }
}

/// Joins a friend's running game, or hosts one when nobody is playing.
pub struct GamingSession<O, S, C>
where
    O: SharedSave + Send + Sync + 'static,
    S: ProcessLauncher,
    C: ProcessLauncher,
{
    locks: LockManager,
    server: ServerSession<O, S>,
    client: ClientSession<C>,
}

impl<O, S, C> GamingSession<O, S, C>
where
    O: SharedSave + Send + Sync + 'static,
    S: ProcessLauncher,
    C: ProcessLauncher,
{
    pub fn new(locks: LockManager, server: ServerSession<O, S>, client: ClientSession<C>) -> Self {
        Self {
            locks,
            server,
            client,
        }
    }

    pub fn server(&self) -> &ServerSession<O, S> {
        &self.server
    }

    pub async fn play(
        &self,
        game_save: &GameSave,
        session: &Session,
        server: &ServerParameters,
        client: &ClientParameters,
    ) -> Result<()> {
        if self.locks.lock_exists(game_save) {
            let host = self.locks.get_locked_session(game_save)?;
            log::info!("{} is hosting, joining {}", host.user_name, host.endpoint());
            return self.client.run_client(&host, client);
        }

        // The client retries its connection, so it may start while the save is
        // still loading.
        let (hosted, joined) = tokio::join!(
            self.server.run_server_with_auto_save(game_save, session, server),
            async { self.client.run_client(session, client) }
        );
        if let Err(e) = &joined {
            log::error!("Client did not start: {}", e);
        }
        hosted.and(joined)
    }
}
