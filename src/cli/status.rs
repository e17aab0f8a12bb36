//! Status command implementation

use anyhow::{Result, bail};

use lingvo_time::game::{RunController, RunPhase};
use lingvo_time::{Outcome, RunId};

/// Runs shown when no run id is given
const RECENT_RUNS: usize = 10;

/// Show recent runs, or the history of one run
pub fn status_command(controller: &RunController, run_id: Option<String>) -> Result<()> {
    let Some(raw) = run_id else {
        return list_runs(controller);
    };
    let Some(run_id) = RunId::parse(&raw) else {
        bail!("Not a run id: {}", raw);
    };

    let summary = controller.run_summary(run_id)?;
    let run = &summary.run;
    println!("Run {} [{}]", run.id, run.game_type);
    println!("  Complexity:  {}", run.complexity);
    println!("  Started:     {}", run.started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Play time:   {}", summary.play_time);
    println!(
        "  Answers:     {} correct, {} incorrect",
        summary.correct, summary.incorrect
    );
    match summary.phase {
        RunPhase::ExercisePending { exercise_id } => {
            println!("  Waiting on:  {}", exercise_id);
        }
        RunPhase::RunActive { .. } => {
            println!("  Waiting on:  nothing (request a new exercise)");
        }
    }

    if !summary.history.is_empty() {
        println!();
        for entry in &summary.history {
            let mark = if entry.outcome == Outcome::Correct { "+" } else { "-" };
            println!(
                "  {} {:<16} answered {:<6} expected {:<6} +{:.1}s",
                mark,
                entry.prompt,
                entry.submitted_answer.as_deref().unwrap_or(""),
                entry.correct_answer,
                entry.reward_seconds.unwrap_or(0.0)
            );
        }
    }

    Ok(())
}

fn list_runs(controller: &RunController) -> Result<()> {
    let runs = controller.recent_runs(RECENT_RUNS)?;
    if runs.is_empty() {
        println!("No runs yet.");
        return Ok(());
    }

    println!("Runs ({}):\n", runs.len());
    for run in runs {
        println!(
            "  {} [{}] complexity {} - {}",
            run.id,
            run.game_type,
            run.complexity,
            run.play_time_display()
        );
    }
    Ok(())
}
