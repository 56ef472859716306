// Entrypoint for the CLI application.
// - Loads the config, authorizes against Pocket and saves a new token.
// - Picks the full-screen list or the line-based fallback and runs it.
// - Exit code 1 when anything fails, 0 on a normal quit.

use anyhow::{Context, Result};
use pocket_rename::auth::BrowserApproval;
use pocket_rename::config::{self, ConfigFile};
use pocket_rename::console::StdConsole;
use pocket_rename::ui::line::LineFrontend;
use pocket_rename::ui::tui::TuiFrontend;
use pocket_rename::ui::run_session;
use pocket_rename::{worker, ApiClient, ArticleStore, Authorizer};
use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let path = config::path_from_env();
    let mut config_file = match ConfigFile::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    let use_tui = config_file.config.app.use_tui && io::stdout().is_terminal();
    init_logging(use_tui);

    // The blocking client has to be built before any runtime exists.
    let api = match ApiClient::from_env() {
        Ok(api) => api,
        Err(e) => {
            eprintln!("An unknown error occurred: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut console = StdConsole::new();
    let credential = match Authorizer::new(&api).authorize(
        config_file.config.credential(),
        &mut BrowserApproval::new(&mut console),
    ) {
        Ok(credential) => credential,
        Err(e) => {
            eprintln!("Error authenticating with pocket: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config_file.config.store_credential(&credential) {
        if let Err(e) = config_file.save() {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
        log::info!("saved new access token to {}", config_file.path().display());
    }
    drop(config_file);

    let store = ArticleStore::new(api, credential);
    match run_interface(use_tui, &store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the chosen interface on a single-threaded scheduler.
fn run_interface(use_tui: bool, store: &ArticleStore<ApiClient>) -> Result<()> {
    let runtime = worker::runtime().context("Starting the scheduler")?;

    if use_tui {
        match TuiFrontend::enter() {
            Ok(mut tui) => return runtime.block_on(run_session(&mut tui, store)),
            Err(e) => log::warn!("full-screen interface unavailable, using the line interface: {e:#}"),
        }
    }

    let mut line = LineFrontend::new(StdConsole::new());
    runtime.block_on(run_session(&mut line, store))
}

/// Log to stderr, or to a file while the full-screen list owns the terminal.
fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if to_file {
        match open_log_file() {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                // Nowhere safe to write while the screen is taken over.
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    let _ = builder.try_init();
}

fn open_log_file() -> Option<File> {
    let dir: PathBuf = dirs::cache_dir()?.join("pocket-rename");
    fs::create_dir_all(&dir).ok()?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("pocket-rename.log"))
        .ok()
}
