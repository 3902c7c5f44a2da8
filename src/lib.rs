#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else, clippy::missing_errors_doc)]

use crate::{
    config::RuntimeConfiguration,
    error::{BindListenerSnafu, RollcallResult, ServeSnafu},
    routes::router,
    state::RollcallState,
};
use snafu::ResultExt;
use std::future::Future;
use tokio::net::TcpListener;

#[macro_use]
extern crate tracing;

pub mod config;
pub mod data;
pub mod error;
pub mod responses;
pub mod routes;
pub mod state;
pub mod validation;

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve(
    config: &RuntimeConfiguration,
    state: RollcallState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> RollcallResult<()> {
    let address = config.server_address();
    let listener = TcpListener::bind(address)
        .await
        .context(BindListenerSnafu { address })?;

    info!(?address, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context(ServeSnafu)
}
