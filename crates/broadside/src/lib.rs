//! # Broadside
//!
//! Real-time two-player battleship server.
//!
//! Players connect over WebSocket with a bearer token, get paired through
//! a single-slot queue or by naming a friend, place a fleet of five ships
//! on a 10×10 grid, and take turns firing until one fleet is sunk.
//!
//! The server doesn't own identities or storage. You plug those in:
//!
//! - [`IdentityVerifier`](broadside_session::IdentityVerifier) — checks tokens
//! - [`UserDirectory`](broadside_session::UserDirectory) — looks up accounts
//! - [`GameRecorder`] — stores game records
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! // Implement the three collaborator traits, then:
//! // init_tracing(config.debug);
//! // let server = BroadsideServer::builder()
//! //     .config(config)
//! //     .build(verifier, directory, recorder)
//! //     .await?;
//! // server.run().await
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod handler;
mod logging;
mod recorder;
mod server;

pub use config::{ConfigError, DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
pub use error::BroadsideError;
pub use logging::init_tracing;
pub use recorder::{GameRecorder, GameResult, PersistenceError, SessionRecordId};
pub use server::{BroadsideServer, BroadsideServerBuilder};

/// Everything needed to wire up and run a server.
pub mod prelude {
    pub use crate::{
        BroadsideError, BroadsideServer, BroadsideServerBuilder, ConfigError,
        GameRecorder, GameResult, PersistenceError, ServerConfig,
        SessionRecordId, init_tracing,
    };
    pub use broadside_protocol::{
        AttackResult, ClientMessage, DestroyedShip, GameId, ServerMessage,
        UserId,
    };
    pub use broadside_session::{
        AuthError, Claims, Identity, IdentityVerifier, UserDirectory,
        UserRecord,
    };
}
