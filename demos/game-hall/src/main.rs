//! Runs a Parlor server with the standard games.
//!
//! ```text
//! PORT=3000 PARLOR_LOG=parlor=debug cargo run -p game-hall
//! ```

use parlor::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    parlor::init_tracing(&config);

    let server = ParlorServer::builder()
        .config(config)
        .catalogue(Catalogue::standard())
        .build()
        .await?;

    tracing::info!(addr = %server.local_addr()?, "game hall open");
    server.run().await?;
    Ok(())
}
