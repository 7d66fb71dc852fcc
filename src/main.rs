use flagquiz::catalog::FlagCatalog;
use flagquiz::config::{ConfigError, GameConfig};
use flagquiz::engine::RoundEngine;
use flagquiz::provider::{self, CountryProvider, ProviderError};
use flagquiz::services::session::{self, SessionError, SessionHandle};
use flagquiz::state::{GameView, Phase};
use flagquiz::store::JsonFileStore;
use flagquiz::terminal::{self, Input};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("session: {0}")]
    Session(#[from] SessionError),
    #[error("stdin: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    if let Err(e) = run().await {
        error!(error = %e, "flagquiz exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = GameConfig::from_env()?;
    let store = JsonFileStore::new(&config.store_path);

    println!("Loading flags...");
    let catalog = match fetch_catalog(&config).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, url = %config.provider_url, "flag data unavailable");
            FlagCatalog::default()
        }
    };

    let help = terminal::help(config.choices);
    let engine = RoundEngine::new(config, catalog, Box::new(store));
    let (handle, task) = session::spawn_session(engine);
    let renderer = tokio::spawn(render_views(handle.subscribe()));

    println!("{help}");
    read_commands(&handle, &help).await?;

    // Closed here means the task already exited; join_session reports why.
    let _ = handle.shutdown().await;
    drop(handle);
    let joined = session::join_session(task).await;
    renderer.abort();
    joined?;
    info!("bye");
    Ok(())
}

async fn fetch_catalog(config: &GameConfig) -> Result<FlagCatalog, ProviderError> {
    let provider = CountryProvider::new(config.provider_url.clone(), config.timeouts)?;
    provider::load_catalog(&provider).await
}

async fn read_commands(handle: &SessionHandle, help: &str) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let view = handle.view();
        match terminal::parse_input(&line, &view) {
            Input::Start if !view.catalog_ready => println!("{}", terminal::UNAVAILABLE_MESSAGE),
            Input::Start => handle.start().await?,
            Input::Guess(label) => handle.guess(label).await?,
            Input::Restart if view.phase == Phase::Ended => handle.restart().await?,
            Input::Restart => handle.abandon().await?,
            Input::Quit => break,
            Input::Help => println!("{help}"),
        }
    }
    Ok(())
}

async fn render_views(mut views: watch::Receiver<GameView>) {
    let mut previous: Option<GameView> = None;
    loop {
        let view = views.borrow_and_update().clone();
        if let Some(text) = terminal::render_change(previous.as_ref(), &view) {
            println!("{text}");
        }
        previous = Some(view);
        if views.changed().await.is_err() {
            break;
        }
    }
}
