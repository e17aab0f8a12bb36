//! HTTP API tests against a server bound to a free local port.

mod common;

use chrono::Duration;
use serde_json::{Value, json};

use common::harness;
use lingvo_time::server::{ApiState, HttpServer, ServerHandle};

struct TestServer {
    handle: Option<ServerHandle>,
    base: String,
    _harness: common::Harness,
}

impl TestServer {
    fn start(script: Vec<i64>, token: Option<&str>) -> (Self, std::sync::Arc<lingvo_time::clock::ManualClock>) {
        let h = harness(script);
        let state = ApiState {
            controller: h.controller.clone(),
            auth_token: token.map(String::from),
        };
        let server = HttpServer::bind(0, state).expect("Failed to bind server");
        let base = format!("http://{}", server.local_addr());
        let clock = h.clock.clone();
        (
            Self {
                handle: Some(server.spawn()),
                base,
                _harness: h,
            },
            clock,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
        }
    }
}

/// Status and JSON body, for success and error responses alike
fn send(request: ureq::Request, body: Option<Value>) -> (u16, Value) {
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => panic!("transport error: {}", e),
    };
    let status = response.status();
    (status, response.into_json().unwrap_or(Value::Null))
}

#[test]
fn test_ping_and_levels() {
    let (server, _) = TestServer::start(vec![0], None);

    let (status, body) = send(ureq::get(&server.url("/ping")), None);
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(ureq::get(&server.url("/levels")), None);
    assert_eq!(status, 200);
    let levels = body["levels"].as_array().unwrap();
    assert_eq!(levels.len(), 9);
    assert_eq!(levels[8]["complexity"], 6.75);
}

#[test]
fn test_full_word_round() {
    let (server, clock) = TestServer::start(vec![0, 1], None);

    let (status, body) = send(
        ureq::post(&server.url("/runs")),
        Some(json!({ "level": 1, "game_type": "word" })),
    );
    assert_eq!(status, 201);
    assert_eq!(body["exercise"]["prompt"], "c_t");
    // The answer is never part of a pending exercise
    assert!(body["exercise"].get("payload").is_none());
    assert!(!body.to_string().contains("\"cat\""));

    let run_id = body["run"]["id"].as_str().unwrap().to_string();
    let exercise_id = body["exercise"]["id"].as_str().unwrap().to_string();

    clock.advance(Duration::seconds(4));
    let (status, body) = send(
        ureq::post(&server.url(&format!("/runs/{}/exercises/{}/answer", run_id, exercise_id))),
        Some(json!({ "submission": "a" })),
    );
    assert_eq!(status, 200);
    assert_eq!(body["outcome"], "correct");
    assert_eq!(body["reward_seconds"], 3.0);
    assert_eq!(body["run"]["play_time_seconds"], 3.0);
    assert!(body["next"]["id"].is_string());

    let (status, body) = send(
        ureq::post(&server.url(&format!("/runs/{}/exercises/{}/answer", run_id, exercise_id))),
        Some(json!({ "submission": "a" })),
    );
    assert_eq!(status, 409);
    assert_eq!(body["error"], "conflict");

    let (status, body) = send(ureq::get(&server.url(&format!("/runs/{}", run_id))), None);
    assert_eq!(status, 200);
    assert_eq!(body["correct"], 1);
    assert_eq!(body["phase"]["state"], "exercise_pending");
    assert_eq!(body["history"][0]["correct_answer"], "a");
}

#[test]
fn test_errors_map_to_status_codes() {
    let (server, _) = TestServer::start(vec![0, 1], None);

    let (status, body) = send(
        ureq::post(&server.url("/runs")),
        Some(json!({ "complexity": -1.0, "game_type": "word" })),
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = send(
        ureq::post(&server.url("/runs")),
        Some(json!({ "level": 1, "game_type": "chess" })),
    );
    assert_eq!(status, 400);

    let (status, body) = send(ureq::get(&server.url("/runs/not-a-uuid")), None);
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad_run_id");

    let unknown = lingvo_time::RunId::new();
    let (status, body) = send(ureq::get(&server.url(&format!("/runs/{}", unknown))), None);
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(ureq::get(&server.url("/nowhere")), None);
    assert_eq!(status, 404);
}

#[test]
fn test_next_exercise_and_listing() {
    let (server, _) = TestServer::start(vec![5, 3, 1], None);

    let (_, body) = send(
        ureq::post(&server.url("/runs")),
        Some(json!({ "complexity": 0.75, "game_type": "math" })),
    );
    assert_eq!(body["run"]["game_type"], "arithmetic");
    assert_eq!(body["exercise"]["prompt"], "5 - 3");
    let run_id = body["run"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(ureq::post(&server.url(&format!("/runs/{}/next", run_id))), None);
    assert_eq!(status, 201);
    let next_id = body["exercise"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        ureq::get(&server.url(&format!("/runs/{}/exercises/{}", run_id, next_id))),
        None,
    );
    assert_eq!(status, 200);
    assert_eq!(body["exercise"]["outcome"], "pending");

    let (status, body) = send(ureq::get(&server.url("/runs?limit=5")), None);
    assert_eq!(status, 200);
    assert_eq!(body["runs"].as_array().unwrap().len(), 1);
}

#[test]
fn test_token_is_required_when_configured() {
    let (server, _) = TestServer::start(vec![0], Some("s3cret"));

    let (status, body) = send(ureq::get(&server.url("/ping")), None);
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(
        ureq::get(&server.url("/ping")).set("X-Lingvo-Token", "s3cret"),
        None,
    );
    assert_eq!(status, 200);
}
