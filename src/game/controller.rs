//! Run orchestration: start a run, serve exercises, score answers

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::checker::check_answer;
use super::generator::generate_payload;
use super::random::RandomSource;
use super::reward::RewardPolicy;
use crate::clock::Clock;
use crate::domain::{Exercise, ExerciseId, GameType, Outcome, Payload, Run, RunId};
use crate::error::{GameError, GameResult};
use crate::illustration::{Illustrator, NoIllustrations, illustrations_for};
use crate::store::RunStore;
use crate::words::WordSource;

/// Where a started run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunPhase {
    /// Between exercises (the last one is answered, no new one issued)
    RunActive { game_type: GameType },
    /// Waiting for an answer to `exercise_id`
    ExercisePending { exercise_id: ExerciseId },
}

/// An exercise as shown to the player; never reveals the answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseView {
    pub id: ExerciseId,
    pub run_id: RunId,
    pub kind: GameType,
    /// Masked word or arithmetic expression
    pub prompt: String,
    pub outcome: Outcome,
    pub created_at: DateTime<Utc>,
}

impl From<&Exercise> for ExerciseView {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            run_id: exercise.run_id,
            kind: exercise.kind(),
            prompt: exercise.payload.prompt(),
            outcome: exercise.outcome,
            created_at: exercise.created_at,
        }
    }
}

/// Result of [`RunController::start`]
#[derive(Debug, Clone, Serialize)]
pub struct StartedRun {
    pub run: Run,
    pub exercise: ExerciseView,
}

/// Result of [`RunController::submit_answer`]
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub exercise_id: ExerciseId,
    pub outcome: Outcome,
    pub reward_seconds: f64,
    pub correct_answer: String,
    pub message: String,
    /// Run state after the reward was applied
    pub run: Run,
    pub illustrations: Vec<String>,
    /// The exercise issued after this one; `None` if generating it failed,
    /// in which case the run waits in `RunActive` for `next_exercise`
    pub next: Option<ExerciseView>,
    /// Why `next` is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_error: Option<String>,
}

/// An answered exercise; safe to show with its answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnsweredExercise {
    pub id: ExerciseId,
    pub prompt: String,
    pub outcome: Outcome,
    pub submitted_answer: Option<String>,
    pub correct_answer: String,
    pub reward_seconds: Option<f64>,
    pub answered_at: Option<DateTime<Utc>>,
}

/// Run overview with phase and answer history
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run: Run,
    pub play_time: String,
    pub phase: RunPhase,
    pub exercises_total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub current: Option<ExerciseView>,
    /// Answered exercises, oldest first
    pub history: Vec<AnsweredExercise>,
}

/// Drives runs through their lifecycle.
///
/// Every operation runs to completion on the calling thread. The store is
/// the only shared state, so one controller can serve many runs at once.
pub struct RunController {
    store: Arc<dyn RunStore>,
    words: Arc<dyn WordSource>,
    rng: Mutex<Box<dyn RandomSource>>,
    clock: Arc<dyn Clock>,
    reward: RewardPolicy,
    illustrator: Box<dyn Illustrator>,
}

impl RunController {
    pub fn new(
        store: Arc<dyn RunStore>,
        words: Arc<dyn WordSource>,
        rng: Box<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            words,
            rng: Mutex::new(rng),
            clock,
            reward: RewardPolicy::default(),
            illustrator: Box::new(NoIllustrations),
        }
    }

    pub fn with_reward_policy(mut self, policy: RewardPolicy) -> Self {
        self.reward = policy;
        self
    }

    pub fn with_illustrator(mut self, illustrator: Box<dyn Illustrator>) -> Self {
        self.illustrator = illustrator;
        self
    }

    /// Create a run and issue its first exercise
    pub fn start(&self, complexity: f64, game_type: GameType) -> GameResult<StartedRun> {
        if !complexity.is_finite() || complexity <= 0.0 {
            return Err(GameError::Validation(format!(
                "complexity must be a positive number, got {}",
                complexity
            )));
        }

        // Generate before creating the run so a bad word list leaves no orphan run
        let payload = self.generate(game_type, complexity)?;
        let run_id = self.store.create_run(complexity, game_type)?;
        let exercise = self.store_exercise(run_id, payload)?;
        let run = self.store.get_run(run_id)?;

        info!(
            "[lingvo:run] Started {} run {} (complexity {})",
            game_type, run_id, complexity
        );
        Ok(StartedRun {
            run,
            exercise: ExerciseView::from(&exercise),
        })
    }

    /// Score an answer, credit the reward, then issue the next exercise
    pub fn submit_answer(
        &self,
        run_id: RunId,
        exercise_id: ExerciseId,
        submission: &str,
    ) -> GameResult<AnswerResult> {
        let exercise = self.owned_exercise(run_id, exercise_id)?;
        if !exercise.is_pending() {
            return Err(GameError::Conflict(format!(
                "exercise {} was already answered ({})",
                exercise_id, exercise.outcome
            )));
        }
        let run = self.store.get_run(run_id)?;

        let correct = match check_answer(&exercise.payload, submission) {
            Ok(correct) => correct,
            Err(GameError::Validation(reason)) => {
                debug!("[lingvo:run] Unparseable answer for {}: {}", exercise_id, reason);
                false
            }
            Err(e) => return Err(e),
        };
        let outcome = if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };

        let now = self.clock.now();
        let reward_seconds = if correct {
            self.reward.reward(&run, &exercise, now)
        } else {
            0.0
        };

        // Pending check and terminal write happen in one transaction; a racing
        // submission that lost gets Conflict here
        let run = self
            .store
            .settle_answer(exercise_id, submission, outcome, reward_seconds, now)?;
        info!(
            "[lingvo:run] Exercise {} answered {} (+{:.1}s, total {})",
            exercise_id,
            outcome,
            reward_seconds,
            run.play_time_display()
        );

        let correct_answer = exercise.payload.correct_answer();
        let message = feedback_message(&exercise.payload, outcome, reward_seconds);
        let illustrations = illustrations_for(self.illustrator.as_ref(), outcome);

        // The answer is already settled; a generation failure must not hide it
        let (next, next_error) = match self.issue_exercise(&run) {
            Ok(next) => (Some(ExerciseView::from(&next)), None),
            Err(e) => {
                warn!(
                    "[lingvo:run] No next exercise for run {} after {}: {}",
                    run.id, exercise_id, e
                );
                (None, Some(e.to_string()))
            }
        };
        Ok(AnswerResult {
            exercise_id,
            outcome,
            reward_seconds,
            correct_answer,
            message,
            run,
            illustrations,
            next,
            next_error,
        })
    }

    /// Issue a fresh exercise without answering the current one
    pub fn next_exercise(&self, run_id: RunId) -> GameResult<ExerciseView> {
        let run = self.store.get_run(run_id)?;
        let exercise = self.issue_exercise(&run)?;
        Ok(ExerciseView::from(&exercise))
    }

    /// One exercise of a run, as shown to the player
    pub fn exercise(&self, run_id: RunId, exercise_id: ExerciseId) -> GameResult<ExerciseView> {
        self.owned_exercise(run_id, exercise_id)
            .map(|e| ExerciseView::from(&e))
    }

    pub fn run(&self, run_id: RunId) -> GameResult<Run> {
        self.store.get_run(run_id)
    }

    pub fn recent_runs(&self, limit: usize) -> GameResult<Vec<Run>> {
        self.store.list_runs(limit)
    }

    /// Current state of a run
    pub fn phase(&self, run_id: RunId) -> GameResult<RunPhase> {
        Ok(self.run_summary(run_id)?.phase)
    }

    /// Run with phase and answer counts
    pub fn run_summary(&self, run_id: RunId) -> GameResult<RunSummary> {
        let run = self.store.get_run(run_id)?;
        let exercises = self.store.list_exercises(run_id)?;

        let count = |outcome: Outcome| exercises.iter().filter(|e| e.outcome == outcome).count();
        let current = exercises.last().filter(|e| e.is_pending());
        let phase = match current {
            Some(e) => RunPhase::ExercisePending { exercise_id: e.id },
            None => RunPhase::RunActive {
                game_type: run.game_type,
            },
        };

        Ok(RunSummary {
            play_time: run.play_time_display(),
            phase,
            exercises_total: exercises.len(),
            correct: count(Outcome::Correct),
            incorrect: count(Outcome::Incorrect),
            current: current.map(ExerciseView::from),
            history: exercises
                .iter()
                .filter(|e| e.outcome.is_terminal())
                .map(|e| AnsweredExercise {
                    id: e.id,
                    prompt: e.payload.prompt(),
                    outcome: e.outcome,
                    submitted_answer: e.submitted_answer.clone(),
                    correct_answer: e.payload.correct_answer(),
                    reward_seconds: e.reward_seconds,
                    answered_at: e.answered_at,
                })
                .collect(),
            run,
        })
    }

    fn owned_exercise(&self, run_id: RunId, exercise_id: ExerciseId) -> GameResult<Exercise> {
        let exercise = self.store.get_exercise(exercise_id)?;
        if exercise.run_id != run_id {
            return Err(GameError::not_found("exercise", exercise_id));
        }
        Ok(exercise)
    }

    fn issue_exercise(&self, run: &Run) -> GameResult<Exercise> {
        let payload = self.generate(run.game_type, run.complexity)?;
        self.store_exercise(run.id, payload)
    }

    fn generate(&self, game_type: GameType, complexity: f64) -> GameResult<Payload> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        generate_payload(game_type, complexity, self.words.as_ref(), &mut **rng)
    }

    fn store_exercise(&self, run_id: RunId, payload: Payload) -> GameResult<Exercise> {
        let id = self.store.create_exercise(run_id, payload.kind(), &payload)?;
        self.store.get_exercise(id)
    }
}

fn feedback_message(payload: &Payload, outcome: Outcome, reward_seconds: f64) -> String {
    match (outcome, payload) {
        (Outcome::Correct, _) => {
            format!("You're right. Great job! +{:.0}s of play time", reward_seconds)
        }
        (_, Payload::Word(task)) => format!(
            "You're mistaken. The missing letter was '{}' ({})",
            payload.correct_answer(),
            task.word
        ),
        (_, Payload::Arithmetic(task)) => format!(
            "You're mistaken. {} = {}",
            task.expression, task.expected
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::game::random::ScriptedSource;
    use crate::store::{GameDb, SqliteRunStore};
    use crate::words::WordLists;
    use chrono::{Duration, TimeZone};

    fn controller(script: Vec<i64>) -> (RunController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ));
        let store = SqliteRunStore::new(GameDb::open_in_memory().unwrap(), clock.clone());
        let words = WordLists::new().with_tier(1, &["cat"]);
        let controller = RunController::new(
            Arc::new(store),
            Arc::new(words),
            Box::new(ScriptedSource::new(script)),
            clock.clone(),
        );
        (controller, clock)
    }

    #[test]
    fn test_start_issues_first_exercise() {
        let (controller, _) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();
        assert_eq!(started.exercise.prompt, "c_t");
        assert_eq!(started.exercise.outcome, Outcome::Pending);
        assert_eq!(started.run.play_time_seconds, 0.0);
        assert_eq!(
            controller.phase(started.run.id).unwrap(),
            RunPhase::ExercisePending {
                exercise_id: started.exercise.id
            }
        );
    }

    #[test]
    fn test_start_rejects_bad_complexity() {
        let (controller, _) = controller(vec![0]);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = controller.start(bad, GameType::Word).unwrap_err();
            assert!(matches!(err, GameError::Validation(_)));
        }
    }

    #[test]
    fn test_start_with_missing_word_list_creates_no_run() {
        let (controller, _) = controller(vec![0]);
        let err = controller.start(6.75, GameType::Word).unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)));
        assert!(controller.recent_runs(10).unwrap().is_empty());
    }

    #[test]
    fn test_correct_answer_rewards_elapsed_time() {
        let (controller, clock) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();

        clock.advance(Duration::seconds(20));
        let result = controller
            .submit_answer(started.run.id, started.exercise.id, "a")
            .unwrap();

        assert_eq!(result.outcome, Outcome::Correct);
        assert!((result.reward_seconds - 15.0).abs() < 1e-9);
        assert!((result.run.play_time_seconds - 15.0).abs() < 1e-9);
        assert_eq!(result.run.last_updated_at, clock.now());
        let next = result.next.as_ref().unwrap();
        assert_ne!(next.id, started.exercise.id);
        assert_eq!(next.kind, GameType::Word);
        assert!(result.next_error.is_none());
        assert!(result.message.starts_with("You're right"));
    }

    #[test]
    fn test_incorrect_answer_gives_no_reward() {
        let (controller, clock) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();

        clock.advance(Duration::seconds(20));
        let result = controller
            .submit_answer(started.run.id, started.exercise.id, "o")
            .unwrap();
        assert_eq!(result.outcome, Outcome::Incorrect);
        assert_eq!(result.reward_seconds, 0.0);
        assert_eq!(result.run.play_time_seconds, 0.0);
        assert_eq!(result.correct_answer, "a");
        assert!(result.message.contains("'a'"));
    }

    #[test]
    fn test_unparseable_arithmetic_answer_is_incorrect() {
        // a=5, b=3, subtract
        let (controller, _) = controller(vec![5, 3, 1]);
        let started = controller.start(0.75, GameType::Arithmetic).unwrap();
        assert_eq!(started.exercise.prompt, "5 - 3");

        let result = controller
            .submit_answer(started.run.id, started.exercise.id, "two")
            .unwrap();
        assert_eq!(result.outcome, Outcome::Incorrect);
        assert_eq!(result.correct_answer, "2");
        assert_eq!(result.message, "You're mistaken. 5 - 3 = 2");
    }

    #[test]
    fn test_double_submission_conflicts() {
        let (controller, clock) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();
        clock.advance(Duration::seconds(4));
        controller
            .submit_answer(started.run.id, started.exercise.id, "a")
            .unwrap();
        let before = controller.run(started.run.id).unwrap().play_time_seconds;

        clock.advance(Duration::seconds(4));
        let err = controller
            .submit_answer(started.run.id, started.exercise.id, "a")
            .unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));
        assert_eq!(controller.run(started.run.id).unwrap().play_time_seconds, before);
    }

    #[test]
    fn test_exercise_from_other_run_is_not_found() {
        let (controller, _) = controller(vec![0, 1]);
        let first = controller.start(0.75, GameType::Word).unwrap();
        let second = controller.start(0.75, GameType::Word).unwrap();
        let err = controller
            .submit_answer(second.run.id, first.exercise.id, "a")
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
    }

    #[test]
    fn test_next_exercise_leaves_previous_pending() {
        let (controller, _) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();
        let next = controller.next_exercise(started.run.id).unwrap();

        let summary = controller.run_summary(started.run.id).unwrap();
        assert_eq!(summary.exercises_total, 2);
        assert_eq!(summary.current.as_ref().map(|e| e.id), Some(next.id));
        let old = controller.exercise(started.run.id, started.exercise.id).unwrap();
        assert_eq!(old.outcome, Outcome::Pending);
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let (controller, _) = controller(vec![0, 1]);
        let started = controller.start(0.75, GameType::Word).unwrap();
        let run_id = started.run.id;
        let r1 = controller.submit_answer(run_id, started.exercise.id, "a").unwrap();
        let r2 = controller.submit_answer(run_id, r1.next.unwrap().id, "z").unwrap();

        let summary = controller.run_summary(run_id).unwrap();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.exercises_total, 3);
        assert_eq!(summary.history.len(), 2);
        assert_eq!(summary.history[1].submitted_answer.as_deref(), Some("z"));
        assert_eq!(
            summary.phase,
            RunPhase::ExercisePending {
                exercise_id: r2.next.unwrap().id
            }
        );
    }

    #[test]
    fn test_flat_reward_policy() {
        let (controller, _) = controller(vec![0, 1]);
        let controller = controller.with_reward_policy(RewardPolicy::Flat { seconds: 60.0 });
        let started = controller.start(1.5, GameType::Arithmetic).unwrap();
        let view = controller.exercise(started.run.id, started.exercise.id).unwrap();
        let answer = evaluate_prompt(&view.prompt);

        let result = controller
            .submit_answer(started.run.id, started.exercise.id, &answer.to_string())
            .unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
        assert_eq!(result.reward_seconds, 90.0);
    }

    /// Serves its words once, then reports the tier as missing
    struct OneShotWords {
        words: Vec<String>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl WordSource for OneShotWords {
        fn words(&self, _tier: u8) -> Option<&[String]> {
            let calls = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            (calls == 0).then_some(self.words.as_slice())
        }
    }

    #[test]
    fn test_scored_answer_survives_failed_next_exercise() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ));
        let store = SqliteRunStore::new(GameDb::open_in_memory().unwrap(), clock.clone());
        let words = OneShotWords {
            words: vec!["cat".to_string()],
            calls: Default::default(),
        };
        let controller = RunController::new(
            Arc::new(store),
            Arc::new(words),
            Box::new(ScriptedSource::new(vec![0, 1])),
            clock.clone(),
        );

        let started = controller.start(0.75, GameType::Word).unwrap();
        clock.advance(Duration::seconds(4));
        let result = controller
            .submit_answer(started.run.id, started.exercise.id, "a")
            .unwrap();

        assert_eq!(result.outcome, Outcome::Correct);
        assert!((result.run.play_time_seconds - 3.0).abs() < 1e-9);
        assert!(result.next.is_none());
        assert!(result.next_error.as_deref().unwrap().contains("tier 1"));
        assert_eq!(
            controller.phase(started.run.id).unwrap(),
            RunPhase::RunActive {
                game_type: GameType::Word
            }
        );
        let err = controller.next_exercise(started.run.id).unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)));
    }

    fn evaluate_prompt(expr: &str) -> i64 {
        let mut tokens = expr.split_whitespace();
        let mut acc: i64 = tokens.next().unwrap().parse().unwrap();
        while let (Some(op), Some(term)) = (tokens.next(), tokens.next()) {
            let term: i64 = term.parse().unwrap();
            acc = if op == "+" { acc + term } else { acc - term };
        }
        acc
    }
}
