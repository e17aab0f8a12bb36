//! Serve command implementation

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use lingvo_time::app::build_controller;
use lingvo_time::config::Config;
use lingvo_time::server::{ApiState, HttpServer};

/// Run the HTTP API in the foreground
pub fn serve_command(config: &Config, db_path: &Path, port: Option<u16>) -> Result<()> {
    let controller = build_controller(config, db_path)?;
    let token = config.settings.http_token.trim();

    let state = ApiState {
        controller: Arc::new(controller),
        auth_token: (!token.is_empty()).then(|| token.to_string()),
    };

    let server = HttpServer::bind(port.unwrap_or(config.settings.http_port), state)?;
    println!("Listening on http://{}", server.local_addr());
    server.run();
    Ok(())
}
