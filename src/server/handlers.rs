//! HTTP request handlers for the game API.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{error, info};

use super::types::{AnswerRequest, ApiError, ApiState, CreateRunRequest};
use crate::domain::{ExerciseId, RunId};
use crate::game::levels;

/// Runs listed by `GET /runs` when no `limit` is given
const DEFAULT_RUN_LIMIT: usize = 20;

pub type HandlerResult = Result<(u16, Value), ApiError>;

/// GET /levels
pub fn handle_levels() -> HandlerResult {
    Ok((200, json!({ "levels": levels() })))
}

/// POST /runs
pub fn handle_create_run(state: &ApiState, body: &str) -> HandlerResult {
    let request: CreateRunRequest = parse_body(body)?;
    let (complexity, game_type) = request.resolve()?;
    let started = state.controller.start(complexity, game_type)?;
    info!(
        "[lingvo:http] Created {} run {}",
        started.run.game_type, started.run.id
    );
    Ok((201, to_json(&started)?))
}

/// GET /runs?limit=N
pub fn handle_list_runs(state: &ApiState, query: Option<&str>) -> HandlerResult {
    let limit = match query_param(query, "limit") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request(format!("bad limit '{}'", raw)))?,
        None => DEFAULT_RUN_LIMIT,
    };
    let runs = state.controller.recent_runs(limit)?;
    Ok((200, json!({ "runs": runs })))
}

/// GET /runs/{id}
pub fn handle_get_run(state: &ApiState, run_id: &str) -> HandlerResult {
    let run_id = parse_run_id(run_id)?;
    let summary = state.controller.run_summary(run_id)?;
    Ok((200, to_json(&summary)?))
}

/// POST /runs/{id}/next
pub fn handle_next_exercise(state: &ApiState, run_id: &str) -> HandlerResult {
    let run_id = parse_run_id(run_id)?;
    let exercise = state.controller.next_exercise(run_id)?;
    Ok((201, json!({ "exercise": exercise })))
}

/// GET /runs/{id}/exercises/{eid}
pub fn handle_get_exercise(state: &ApiState, run_id: &str, exercise_id: &str) -> HandlerResult {
    let run_id = parse_run_id(run_id)?;
    let exercise_id = parse_exercise_id(exercise_id)?;
    let exercise = state.controller.exercise(run_id, exercise_id)?;
    Ok((200, json!({ "exercise": exercise })))
}

/// POST /runs/{id}/exercises/{eid}/answer
pub fn handle_answer(
    state: &ApiState,
    run_id: &str,
    exercise_id: &str,
    body: &str,
) -> HandlerResult {
    let run_id = parse_run_id(run_id)?;
    let exercise_id = parse_exercise_id(exercise_id)?;
    let request: AnswerRequest = parse_body(body)?;

    let result = state
        .controller
        .submit_answer(run_id, exercise_id, &request.submission)?;
    Ok((200, to_json(&result)?))
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        error!("[lingvo:http] Invalid JSON: {}", e);
        ApiError::new(400, "invalid_json").with_details(e.to_string())
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::new(500, "serialization").with_details(e.to_string()))
}

fn parse_run_id(raw: &str) -> Result<RunId, ApiError> {
    RunId::parse(raw).ok_or_else(|| ApiError::new(400, "bad_run_id").with_details(raw))
}

fn parse_exercise_id(raw: &str) -> Result<ExerciseId, ApiError> {
    ExerciseId::parse(raw).ok_or_else(|| ApiError::new(400, "bad_exercise_id").with_details(raw))
}

fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
