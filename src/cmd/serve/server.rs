// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use revise_core::config::SchedulerConfig;
use revise_core::error::Fallible;
use tokio::net::TcpListener;
use tokio::signal;

use crate::cmd::serve::handlers::get_item_handler;
use crate::cmd::serve::handlers::list_items_handler;
use crate::cmd::serve::handlers::not_found_handler;
use crate::cmd::serve::handlers::queue_handler;
use crate::cmd::serve::handlers::review_handler;
use crate::cmd::serve::handlers::sweep_handler;
use crate::collection::Collection;
use crate::db::Database;

pub struct ServerConfig {
    pub directory: Option<String>,
    pub host: String,
    pub port: u16,
}

/// Shared by every request. SQLite connections are not `Sync`, so the
/// database sits behind a mutex and each handler holds it only while it
/// talks to the store.
#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<SchedulerConfig>,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let Collection {
        directory,
        db,
        config: scheduler_config,
    } = Collection::new(config.directory)?;
    log::debug!("Serving collection in {}", directory.display());

    let state = ServerState {
        db: Arc::new(Mutex::new(db)),
        config: Arc::new(scheduler_config),
    };
    let app = Router::new();
    let app = app.route("/items", get(list_items_handler));
    let app = app.route("/items/{id}", get(get_item_handler));
    let app = app.route("/items/{id}/review", post(review_handler));
    let app = app.route("/queue", get(queue_handler));
    let app = app.route("/sweep", post(sweep_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::debug!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => log::error!("Failed to install Ctrl+C handler: {e}"),
    }
}
