mod actions;
mod api;
mod app;
mod cli;
mod config;
mod editor;
mod effects;
mod form;
mod relay;
mod session;
mod state;
mod types;
mod ui;
mod utils;

use api::{ApiClient, LoginApi, WorkflowApi};
use app::App;
use clap::Parser;
use cli::Cli;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use config::Config;
use effects::HttpBackend;
use session::{FileTokenStore, Session};
use state::AppState;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "workflow-console.log";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config_dir = Config::config_dir()?;
    init_tracing(&config_dir)?;

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    if !config_path.exists() {
        Config::default()
            .save_to(&config_path)
            .wrap_err_with(|| format!("Failed to write {}", config_path.display()))?;
        info!("wrote default config to {}", config_path.display());
    }
    let config = Config::resolve(&config_path, &cli.url_overrides())?;

    let store = FileTokenStore::new(config_dir);
    let token_path = store.path().clone();
    let session = Session::new(store);
    if cli.logout {
        session.logout()?;
        println!("Signed out: removed {}", token_path.display());
        return Ok(());
    }

    let bootstrap = session.bootstrap(cli.launch_url.as_deref())?;
    info!(
        "session bootstrap: status={:?} source={:?}",
        bootstrap.status, bootstrap.source
    );

    let workflow_client = ApiClient::new(
        &config.server.workflow_api_url,
        config.workflow_timeout(),
        session.clone(),
    )?;
    let login_client = ApiClient::new(
        &config.server.login_api_url,
        config.login_timeout(),
        session,
    )?;
    info!(
        "workflow API {} / login API {}",
        workflow_client.base_url(),
        login_client.base_url()
    );
    let backend = HttpBackend::new(LoginApi::new(login_client), WorkflowApi::new(workflow_client));

    let mut state = AppState::new(
        bootstrap.status,
        config.server.login_url.clone(),
        config.redirect_grace(),
    );
    state.location = bootstrap.location;

    let terminal = ratatui::init();
    let app_result = App::new(state, Arc::new(backend)).run(terminal).await;
    ratatui::restore();

    if let Some(message) = app_result?.exit_message {
        println!("{message}");
    }
    Ok(())
}

/// Log to a file in the config directory; the terminal belongs to the UI
fn init_tracing(config_dir: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_dir.join(LOG_FILE))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
