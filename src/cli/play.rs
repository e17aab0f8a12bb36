//! Play command: a terminal game loop

use anyhow::Result;
use std::io::{BufRead, Write};

use lingvo_time::game::{ExerciseView, RunController, level};
use lingvo_time::{GameType, Outcome, RunId, format_seconds};

/// Quit command
const QUIT: &str = ":q";
/// Skip command; an empty line skips too
const SKIP: &str = ":n";

/// Play until the player quits (`:q`) or input ends.
///
/// Commands start with `:` so that every single letter stays a valid
/// answer. Returns the id of the run played.
pub fn play_session<R: BufRead, W: Write>(
    controller: &RunController,
    game_type: GameType,
    level_number: u8,
    input: &mut R,
    output: &mut W,
) -> Result<RunId> {
    let chosen = level(level_number);

    let started = controller.start(chosen.complexity, game_type)?;
    let run_id = started.run.id;
    writeln!(
        output,
        "{} - {} game. Type your answer, '{}' (or Enter) to skip, '{}' to quit.",
        chosen.label, game_type, SKIP, QUIT
    )?;

    let mut current = started.exercise;
    loop {
        show_prompt(output, &current)?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim_end_matches(['\r', '\n']);

        match answer {
            QUIT => break,
            SKIP | "" => {
                current = controller.next_exercise(run_id)?;
            }
            _ => {
                let result = controller.submit_answer(run_id, current.id, answer)?;
                writeln!(output, "{}", result.message)?;
                if result.outcome == Outcome::Correct {
                    writeln!(output, "Play time: {}", result.run.play_time_display())?;
                }
                for url in &result.illustrations {
                    writeln!(output, "  {}", url)?;
                }
                current = match result.next {
                    Some(next) => next,
                    None => controller.next_exercise(run_id)?,
                };
            }
        }
    }

    let run = controller.run(run_id)?;
    writeln!(
        output,
        "\nTotal play time earned: {}",
        format_seconds(run.play_time_seconds)
    )?;
    Ok(run_id)
}

fn show_prompt<W: Write>(output: &mut W, exercise: &ExerciseView) -> Result<()> {
    match exercise.kind {
        GameType::Word => writeln!(output, "\nMissing letter: {}", exercise.prompt)?,
        GameType::Arithmetic => writeln!(output, "\n{} = ?", exercise.prompt)?,
    }
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}
