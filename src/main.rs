use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookvault::{api, store::Store};

#[derive(Parser)]
#[command(name = "bookvault")]
#[command(about = "Personal book-tracking server with a JSON document store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bookvault server
    Serve {
        /// Port for the HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Directory holding the document file (defaults to the platform data dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory holding rotation backups (defaults to `backups` under the data dir)
        #[arg(long)]
        backup_dir: Option<PathBuf>,

        /// Rotation backups to retain
        #[arg(long, default_value = "10")]
        max_backups: usize,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "bookvault=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_store(
    data_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    max_backups: usize,
) -> anyhow::Result<Store> {
    let store = match data_dir {
        Some(data_dir) => {
            let backup_dir = backup_dir.unwrap_or_else(|| data_dir.join("backups"));
            Store::open(data_dir, backup_dir)?
        }
        None => Store::open_default()?,
    };
    Ok(store.with_max_backups(max_backups))
}

async fn serve(store: Store, port: u16) -> anyhow::Result<()> {
    let app = api::create_router(store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    tracing::info!("bookvault server listening on http://127.0.0.1:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            port,
            data_dir,
            backup_dir,
            max_backups,
        }) => {
            let store = open_store(data_dir, backup_dir, max_backups)?;
            serve(store, port).await?;
        }
        None => {
            // Default: serve on port 8000 out of the platform data dir
            let store = open_store(None, None, bookvault::store::DEFAULT_MAX_BACKUPS)?;
            serve(store, 8000).await?;
        }
    }

    Ok(())
}
