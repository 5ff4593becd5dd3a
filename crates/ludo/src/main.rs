use ludo::prelude::*;
use tracing_subscriber::EnvFilter;

/// Bind target when `LUDO_BIND` is unset.
const DEFAULT_LISTEN: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() -> Result<(), LudoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let bind = std::env::var("LUDO_BIND").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());

    let server = LudoServer::builder().bind(&bind).build().await?;
    server.run().await
}
