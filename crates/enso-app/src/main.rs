//! Headless peer (native): joins a room, mirrors its shapes and logs what
//! other clients draw.

#[cfg(feature = "native")]
mod peer {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use clap::Parser;
    use enso_app::{Engine, EngineConfig, SyncOutcome};
    use enso_core::history::HttpHistoryLoader;
    use enso_core::sync::{NativeWebSocket, SyncEvent};
    use enso_render::RecordingSurface;
    use kurbo::Size;

    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    #[derive(Debug, Parser)]
    #[command(name = "enso-peer", version, about = "Headless Enso room peer")]
    pub struct Args {
        /// Room channel WebSocket URL
        #[arg(long, env = "ENSO_SERVER", default_value = "ws://localhost:8080")]
        pub server: String,

        /// Room to join
        #[arg(long, env = "ENSO_ROOM")]
        pub room: String,

        /// Base URL of the history service; history is skipped when absent
        #[arg(long, env = "ENSO_API")]
        pub api: Option<String>,

        /// Session token sent to the history service
        #[arg(long, env = "ENSO_TOKEN", hide_env_values = true)]
        pub token: Option<String>,

        /// Write the final shape list here as JSON
        #[arg(long)]
        pub output: Option<PathBuf>,

        /// Stop after this many seconds (0 runs until the server disconnects)
        #[arg(long, default_value_t = 0)]
        pub duration: u64,
    }

    pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
        let surface = RecordingSurface::new(Size::new(1280.0, 720.0));
        let mut engine = Engine::new(args.room.clone(), surface, EngineConfig::default())?;

        if let Some(api) = &args.api {
            let mut loader = HttpHistoryLoader::new(api.clone());
            if let Some(token) = &args.token {
                loader = loader.with_token(token.clone());
            }
            // A failed load is logged by the engine; the peer keeps going.
            let _ = pollster::block_on(engine.load_history(&loader));
        }

        let mut socket = NativeWebSocket::new();
        socket.connect_room(&args.server, &args.room)?;
        log::info!("Connecting to {} for room {}", args.server, args.room);

        let deadline = (args.duration > 0)
            .then(|| Instant::now() + Duration::from_secs(args.duration));

        'run: loop {
            for event in socket.poll_events() {
                match event {
                    SyncEvent::Connected => log::info!("Joined room {}", args.room),
                    SyncEvent::Message(text) => match engine.handle_sync_text(&text) {
                        SyncOutcome::Appended(index) => {
                            log::info!("Shape {index} drawn ({} total)", engine.store().len());
                        }
                        SyncOutcome::Replaced(index) => log::info!("Shape {index} moved"),
                        SyncOutcome::Ignored => {}
                    },
                    SyncEvent::Error { message } => {
                        log::error!("Room socket error: {message}");
                        break 'run;
                    }
                    SyncEvent::Disconnected => {
                        log::info!("Room socket closed");
                        break 'run;
                    }
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        socket.disconnect();

        if let Some(path) = &args.output {
            let json = serde_json::to_string_pretty(engine.store().all())?;
            std::fs::write(path, json)?;
            log::info!("Wrote {} shapes to {}", engine.store().len(), path.display());
        }
        Ok(())
    }
}

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Enso peer");

    if let Err(e) = peer::run(peer::Args::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
