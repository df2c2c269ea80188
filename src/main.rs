use buddy_save::app::{ConsoleApp, BANNER, FAREWELL};
use buddy_save::settings::{BuddySaveConfig, DEFAULT_CONFIG_FILE};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "buddy-save", about = "Take turns hosting a shared game save")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Start");
    println!("{}", BANNER);

    match BuddySaveConfig::load(&args.config) {
        Ok(config) => {
            let app = ConsoleApp::from_config(&config);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            if let Err(e) = app.run(stdin).await {
                log::error!("Command loop stopped: {}", e);
            }
        }
        Err(e) => log::error!("Failed to start: {}", e),
    }

    println!("{}", FAREWELL);
    log::info!("Exit");
}
