//! HTTP API for playing runs from a browser or another client
//!
//! Listens on localhost and accepts:
//! - GET  /ping, GET /levels
//! - POST /runs, GET /runs, GET /runs/{id}
//! - POST /runs/{id}/next
//! - GET  /runs/{id}/exercises/{eid}
//! - POST /runs/{id}/exercises/{eid}/answer

mod handlers;
mod types;

pub use types::{AnswerRequest, ApiError, ApiState, CreateRunRequest};

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Response, Server};
use tracing::{debug, error, info};

use handlers::HandlerResult;

const AUTH_HEADER: &str = "X-Lingvo-Token";
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024; // 2 MiB

/// A bound HTTP server, not yet accepting requests
pub struct HttpServer {
    server: Arc<Server>,
    addr: SocketAddr,
    state: ApiState,
}

/// A server running on a background thread
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    thread: JoinHandle<()>,
}

impl HttpServer {
    /// Bind to `127.0.0.1:port` (port 0 picks a free one)
    pub fn bind(port: u16, state: ApiState) -> Result<Self> {
        let bind_addr = format!("127.0.0.1:{}", port);
        let server = Server::http(&bind_addr)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Failed to start server on {}", bind_addr))?;
        let addr = server
            .server_addr()
            .to_ip()
            .context("Server is not listening on an IP address")?;

        let auth_enabled = state
            .auth_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        info!(
            "[lingvo:http] Server listening on http://{} (auth: {})",
            addr,
            if auth_enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            server: Arc::new(server),
            addr,
            state,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve requests on the current thread until the server is unblocked
    pub fn run(self) {
        serve(&self.server, &self.state);
    }

    /// Serve requests on a background thread
    pub fn spawn(self) -> ServerHandle {
        let server = Arc::clone(&self.server);
        let addr = self.addr;
        let thread = thread::spawn(move || serve(&self.server, &self.state));
        ServerHandle {
            server,
            addr,
            thread,
        }
    }
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting requests and wait for the serving thread
    pub fn shutdown(self) {
        self.server.unblock();
        if self.thread.join().is_err() {
            error!("[lingvo:http] Server thread panicked");
        }
    }
}

fn serve(server: &Server, state: &ApiState) {
    for mut request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url.as_str(), None),
        };
        debug!("[lingvo:http] {} {}", method, path);

        if !is_authorized(&request, state.auth_token.as_deref()) {
            respond_error(request, ApiError::new(401, "unauthorized"));
            continue;
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let needs_body = method == "POST";
        let body = if needs_body {
            match read_request_body(&mut request) {
                Ok(body) => body,
                Err(err) => {
                    respond_error(request, err);
                    continue;
                }
            }
        } else {
            String::new()
        };

        let result: HandlerResult = match (method.as_str(), segments.as_slice()) {
            ("GET", ["ping"]) => Ok((
                200,
                serde_json::json!({
                    "status": "ok",
                    "version": env!("CARGO_PKG_VERSION"),
                }),
            )),
            ("GET", ["levels"]) => handlers::handle_levels(),
            ("GET", ["runs"]) => handlers::handle_list_runs(state, query),
            ("POST", ["runs"]) => handlers::handle_create_run(state, &body),
            ("GET", ["runs", run_id]) => handlers::handle_get_run(state, run_id),
            ("POST", ["runs", run_id, "next"]) => handlers::handle_next_exercise(state, run_id),
            ("GET", ["runs", run_id, "exercises", exercise_id]) => {
                handlers::handle_get_exercise(state, run_id, exercise_id)
            }
            ("POST", ["runs", run_id, "exercises", exercise_id, "answer"]) => {
                handlers::handle_answer(state, run_id, exercise_id, &body)
            }
            _ => Err(ApiError::new(404, "not_found")),
        };

        match result {
            Ok((status, value)) => respond_json(request, status, &value),
            Err(err) => {
                if err.status >= 500 {
                    error!(
                        "[lingvo:http] {} {} failed: {}",
                        method,
                        path,
                        err.details.as_deref().unwrap_or(err.error)
                    );
                }
                respond_error(request, err);
            }
        }
    }
}

fn is_authorized(request: &tiny_http::Request, expected: Option<&str>) -> bool {
    let Some(expected) = expected.filter(|t| !t.trim().is_empty()) else {
        return true;
    };

    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(AUTH_HEADER))
        .is_some_and(|h| h.value.as_str() == expected)
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid")
}

fn read_request_body(request: &mut tiny_http::Request) -> Result<String, ApiError> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[lingvo:http] Failed to read body: {}", e);
        return Err(ApiError::bad_request(e.to_string()));
    }

    if body.len() > MAX_BODY_BYTES {
        return Err(ApiError::new(413, "payload_too_large"));
    }

    Ok(body)
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: &serde_json::Value) {
    let body =
        serde_json::to_string(value).unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(status_code)
        .with_header(json_content_type());
    let _ = request.respond(response);
}

fn respond_error(request: tiny_http::Request, err: ApiError) {
    let status = err.status;
    let value = serde_json::to_value(&err)
        .unwrap_or_else(|_| serde_json::json!({ "error": err.error }));
    respond_json(request, status, &value);
}
