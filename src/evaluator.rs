use crate::decimal;
use crate::error::{DrillError, InvalidStateError};
use crate::problem::Problem;
use crate::session::{Outcome, SessionState};

/// Evaluate one submitted answer against the live problem.
///
/// Unreadable input only sets feedback. A readable answer always counts as an
/// attempt; a wrong one keeps the same problem, a correct one installs
/// `next_problem()` unless it was the last one needed. The replacement is
/// drawn before any counter moves, so on error the state is untouched.
pub fn evaluate<F>(
    state: &mut SessionState,
    raw: &str,
    next_problem: F,
) -> Result<Outcome, DrillError>
where
    F: FnOnce() -> Result<Problem, DrillError>,
{
    if !state.is_active() {
        tracing::warn!("answer submitted to a finished session");
        return Err(InvalidStateError::SessionFinished.into());
    }

    let answer = match decimal::parse(raw) {
        Ok(answer) => answer,
        Err(err) => {
            tracing::debug!(%err, "answer not understood");
            state.set_feedback(Some(Outcome::ParseError));
            return Ok(Outcome::ParseError);
        }
    };

    if answer != state.current_problem().expected_answer {
        tracing::debug!(
            problem = state.problem_number(),
            %answer,
            expected = %state.current_problem().expected_answer,
            "wrong answer"
        );
        state.count_attempt(false);
        state.set_feedback(Some(Outcome::Wrong));
        return Ok(Outcome::Wrong);
    }

    let last_needed = state.remaining() == Some(1);
    let replacement = if last_needed {
        None
    } else {
        Some(next_problem()?)
    };

    tracing::debug!(problem = state.problem_number(), "correct answer");
    state.count_attempt(true);
    state.set_feedback(Some(Outcome::Correct));
    match replacement {
        Some(problem) => state.install_problem(problem),
        None => state.finish(),
    }
    Ok(Outcome::Correct)
}
