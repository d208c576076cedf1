use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use proctop::app::App;
use proctop::config::{Config, load_config, load_config_from_path};
use proctop::dashboard::{self, TICK_RATE};
use proctop::event::EventHandler;
use proctop::system::collector::Collector;
use proctop::system::source::ProcFs;
use proctop::system::users::UserDirectory;
use proctop::{logging, terminal};

/// Delay between the priming CPU sample and the first frame, so the first
/// breakdown is a real rate.
const PRIMING_DELAY: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "proctop", about = "Live process and system monitor for /proc")]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the counter filesystem
    #[arg(long)]
    proc_root: Option<PathBuf>,

    /// Processes shown per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Color theme: dark, light, mono
    #[arg(long)]
    theme: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(cli.log_file.as_deref(), cli.log_json, &config.logging.level)?;

    tracing::info!(
        proc_root = %config.general.proc_root.display(),
        page_size = config.general.page_size,
        theme = %config.colors.theme,
        "starting"
    );

    let source = ProcFs::new(&config.general.proc_root);
    let collector = Collector::new(Box::new(source), UserDirectory::from_system());
    let mut app = App::new(&config, collector).wrap_err_with(|| {
        format!(
            "cannot read CPU counters under {}",
            config.general.proc_root.display()
        )
    })?;

    let (mut terminal, mut session) = terminal::init()?;

    tokio::time::sleep(PRIMING_DELAY).await;
    app.refresh_data();

    let mut events = EventHandler::new(TICK_RATE);
    dashboard::run(&mut terminal, &mut session, &mut app, &mut events).await
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ref root) = cli.proc_root {
        config.general.proc_root = root.clone();
    }
    if let Some(size) = cli.page_size {
        config.general.page_size = size;
    }
    if let Some(ref theme) = cli.theme {
        config.colors.theme = theme.clone();
    }

    config
}
