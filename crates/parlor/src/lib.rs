//! # Parlor
//!
//! A server for multiplayer turn-based games played in shared rooms.
//!
//! Every installed game gets its own namespace. Clients join a room of a
//! namespace by name, fetch a snapshot of its state, then keep a replica
//! in sync by replaying the `apply_patches` broadcasts that follow each
//! accepted command.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! # async fn start() -> Result<(), ParlorError> {
//! let config = ServerConfig::from_env()?;
//! parlor::init_tracing(&config);
//!
//! let server = ParlorServer::builder()
//!     .config(config)
//!     .catalogue(Catalogue::standard())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod catalogue;
mod config;
mod dispatcher;
mod error;
mod handler;
mod server;

pub use catalogue::{Catalogue, CatalogueEntry, GameDescriptor, Installer};
pub use config::{ConfigError, ServerConfig};
pub use dispatcher::{AVAILABLE_GAMES, Dispatcher, Link, ROOT_NAMESPACE};
pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.log_filter` applies. Does
/// nothing if a global subscriber is already installed.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub mod prelude {
    pub use crate::{
        Catalogue, GameDescriptor, ParlorError, ParlorServer, ServerConfig,
    };
    pub use parlor_protocol::{ClientFrame, ServerFrame, events};
    pub use parlor_room::{CommandError, Game, Notice};
    pub use parlor_transport::ConnectionId;
}
