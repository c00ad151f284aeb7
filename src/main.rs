use std::sync::Arc;

use clap::Parser;
use teamsheet::{
    config::{Config, create_app},
    sheet::{OfflineSheet, RowStore, remote::RemoteSheet},
    state::AppState,
};

#[derive(Parser)]
#[command(about = "Tournament registration backend")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let config = Config::from_env();

    // A missing or unparsable credential is not fatal: the service runs,
    // every submission lands in the fallback file instead.
    let store: Arc<dyn RowStore> = match RemoteSheet::from_config(&config) {
        Ok(sheet) => Arc::new(sheet),
        Err(e) => {
            tracing::warn!(
                "spreadsheet client unavailable, registrations will use \
                 the local fallback: {e}"
            );
            Arc::new(OfflineSheet::new(e))
        }
    };

    let app = create_app(AppState::new(config, store));

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
