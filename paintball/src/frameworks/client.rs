// Framework bootstrap for the game client.

use crate::domain::state::display_name_or_default;
use crate::domain::{GameTuning, RemoteStateStore, StoreError};
use crate::frameworks::config::{self, StoreMode};
use crate::interface_adapters::stdin::stdin_reader;
use crate::interface_adapters::{ArcadeWorld, LocalStore, WsStore};
use crate::use_cases::{
    InputCommand, LocalSimulation, PaintballScene, ReplicationBridge, client_task,
};

use rand::{SeedableRng, rngs::StdRng};
use std::io::{self, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::sync::{Notify, mpsc};
use tracing::{Instrument, info, info_span};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they do not interleave with the name prompt.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

async fn prompt_name<R>(lines: &mut Lines<R>) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter your name: ").await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let raw_name = match config::player_name() {
        Some(name) => name,
        None => prompt_name(&mut lines).await?,
    };
    let identity = display_name_or_default(&raw_name);

    let (width, height) = config::playfield_size();
    let sim = LocalSimulation::new(
        ArcadeWorld::new(width, height),
        GameTuning::default(),
        StdRng::from_os_rng(),
        identity.clone(),
    );

    let (input_tx, input_rx) = mpsc::channel(config::INPUT_CHANNEL_CAPACITY);
    tokio::spawn(stdin_reader(lines, input_tx));

    let shutdown = Arc::new(Notify::new());
    let ctrl_c = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.notify_one();
        }
    });

    let mode = config::store_mode();
    info!(%identity, ?mode, width, height, "starting client");

    let result = match mode {
        StoreMode::Ws => {
            let url = config::store_url();
            let store = WsStore::connect(&url).await.map_err(io::Error::other)?;
            run_scene(sim, store, input_rx, shutdown).await
        }
        StoreMode::Memory => run_scene(sim, LocalStore::default(), input_rx, shutdown).await,
    };

    result
        .inspect_err(|e| tracing::error!(error = %e, "client stopped"))
        .map_err(io::Error::other)
}

async fn run_scene<S: RemoteStateStore>(
    sim: LocalSimulation<ArcadeWorld>,
    store: S,
    input_rx: mpsc::Receiver<InputCommand>,
    shutdown: Arc<Notify>,
) -> std::result::Result<(), StoreError> {
    let identity = sim.identity().to_string();
    let mut scene = PaintballScene::new(sim, ReplicationBridge::new(store, identity.clone()));

    client_task(&mut scene, input_rx, config::TICK_INTERVAL, shutdown)
        .instrument(info_span!("client", %identity))
        .await?;

    info!(score = scene.sim().score(), "game over");
    Ok(())
}
