use crate::backup::{BackupManager, LatestSaveTypeProvider, RollingBackups, StdSaveCopier};
use crate::domain::save::{GameSave, Session};
use crate::error::{Error, Result};
use crate::lock::LockManager;
use crate::orchestrator::{SharedSave, SharedSaveOrchestrator};
use crate::services::clock::SystemClock;
use crate::services::notifier::ConsoleNotifier;
use crate::services::process::{ProcessLauncher, TokioProcessLauncher};
use crate::session::{ClientParameters, ClientSession, GamingSession, ServerParameters, ServerSession};
use crate::settings::BuddySaveConfig;
use crate::sync::GameSaveSyncManager;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const BANNER: &str = "∞∞∞∞∞∞∞ Buddy Save ∞∞∞∞∞∞∞";
pub const FAREWELL: &str = "Bye Buddy! ;)";
const PROMPT: &str = "Waiting for action command (play, run, load, save, exit):";

pub type ConsoleSync = GameSaveSyncManager<StdSaveCopier, SystemClock, ConsoleNotifier>;
pub type ConsoleOrchestrator = SharedSaveOrchestrator<ConsoleSync, ConsoleNotifier>;
pub type ConsoleApp = App<ConsoleOrchestrator, TokioProcessLauncher, TokioProcessLauncher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Run,
    Load,
    Save,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "play" => Some(Command::Play),
            "run" => Some(Command::Run),
            "load" => Some(Command::Load),
            "save" => Some(Command::Save),
            "exit" => Some(Command::Exit),
            _ => None,
        }
    }
}

pub struct App<O, S, C>
where
    O: SharedSave + Send + Sync + 'static,
    S: ProcessLauncher,
    C: ProcessLauncher,
{
    game_save: GameSave,
    session: Session,
    server: ServerParameters,
    client: ClientParameters,
    gaming: GamingSession<O, S, C>,
}

impl ConsoleApp {
    /// Wires the real filesystem, clock, console and process launcher.
    pub fn from_config(config: &BuddySaveConfig) -> Self {
        let copier = StdSaveCopier;
        let rolling = RollingBackups::new(config.backup_directories(), copier, SystemClock);
        let backups = BackupManager::new(rolling, copier);
        let sync = GameSaveSyncManager::new(copier, backups, LatestSaveTypeProvider, ConsoleNotifier);
        let orchestrator = SharedSaveOrchestrator::new(LockManager, sync, ConsoleNotifier);
        let gaming = GamingSession::new(
            LockManager,
            ServerSession::new(orchestrator, TokioProcessLauncher),
            ClientSession::new(TokioProcessLauncher),
        );
        App::new(config, gaming)
    }
}

impl<O, S, C> App<O, S, C>
where
    O: SharedSave + Send + Sync + 'static,
    S: ProcessLauncher,
    C: ProcessLauncher,
{
    pub fn new(config: &BuddySaveConfig, gaming: GamingSession<O, S, C>) -> Self {
        Self {
            game_save: config.game_save(),
            session: config.session.clone(),
            server: config.server.clone(),
            client: config.client.clone(),
            gaming,
        }
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        let server = self.gaming.server();
        match command {
            Command::Play => {
                self.gaming
                    .play(&self.game_save, &self.session, &self.server, &self.client)
                    .await
            }
            Command::Run => {
                server
                    .run_server_with_auto_save(&self.game_save, &self.session, &self.server)
                    .await
            }
            Command::Load => server.load(&self.game_save, &self.session).await.map(|_| ()),
            Command::Save => server.save(&self.game_save, &self.session).await,
            Command::Exit => Ok(()),
        }
    }

    /// Reads commands until `exit` or end of input. A failing command is
    /// reported and the loop carries on.
    pub async fn run<R: AsyncBufRead + Unpin>(&self, input: R) -> Result<()> {
        let mut lines = input.lines();
        loop {
            println!("{}", PROMPT);
            let _ = std::io::stdout().flush();

            let Some(line) = lines
                .next_line()
                .await
                .map_err(Error::io("read command"))?
            else {
                log::debug!("Input closed");
                return Ok(());
            };

            let Some(command) = Command::parse(&line) else {
                if !line.trim().is_empty() {
                    log::debug!("Unknown command {:?}", line.trim());
                }
                continue;
            };
            if command == Command::Exit {
                return Ok(());
            }

            log::info!("Running {:?}", command);
            if let Err(e) = self.execute(command).await {
                log::error!("{:?} failed: {}", command, e);
            }
        }
    }
}
