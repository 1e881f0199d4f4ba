use crate::catalog::UnitCatalog;
use crate::error::ConfigError;
use crate::problem::{Difficulty, Problem};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLength {
    /// Finished after this many correct answers.
    Count(u32),
    /// Finished when the wall clock passes start + `secs`.
    Timed { secs: u32 },
}

impl SessionLength {
    pub fn minutes(minutes: u32) -> Self {
        SessionLength::Timed {
            secs: minutes.saturating_mul(60),
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, SessionLength::Timed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub category: String,
    /// Advisory filter; ignored when it leaves fewer than two units.
    pub allowed_units: Vec<String>,
    pub difficulty: Difficulty,
    pub length: SessionLength,
}

impl SessionConfig {
    pub fn new(category: impl Into<String>, length: SessionLength) -> Self {
        Self {
            category: category.into(),
            allowed_units: Vec::new(),
            difficulty: Difficulty::default(),
            length,
        }
    }

    pub fn with_units<S: AsRef<str>>(mut self, units: &[S]) -> Self {
        self.allowed_units = units.iter().map(|u| u.as_ref().to_string()).collect();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn validate(&self, catalog: &UnitCatalog) -> Result<(), ConfigError> {
        let category = catalog.category(&self.category)?;
        if let Some(unit) = self
            .allowed_units
            .iter()
            .find(|u| category.exponent_of(u).is_none())
        {
            return Err(ConfigError::UnknownUnit {
                category: self.category.clone(),
                unit: unit.clone(),
            });
        }
        match self.length {
            SessionLength::Count(0) => Err(ConfigError::ZeroQuestionCount),
            SessionLength::Timed { secs: 0 } => Err(ConfigError::ZeroDuration),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Active,
    Finished,
}

/// Result of one evaluated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Wrong,
    ParseError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Remaining(u32),
    Deadline(DateTime<Utc>),
}

/// Final score, derived from the counters only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub correct: u32,
    pub attempted: u32,
    pub percentage: u32,
    pub perfect: bool,
}

impl Summary {
    pub fn from_counts(correct: u32, attempted: u32) -> Self {
        Self {
            correct,
            attempted,
            percentage: rounded_percentage(correct, attempted),
            perfect: attempted > 0 && correct == attempted,
        }
    }
}

/// `round(100 * correct / attempted)` with ties to even, 0 when nothing was attempted.
fn rounded_percentage(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        return 0;
    }
    let scaled = 100 * u64::from(correct);
    let attempted = u64::from(attempted);
    let (q, r) = (scaled / attempted, scaled % attempted);
    let rounded = match (2 * r).cmp(&attempted) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q % 2 == 1 => q + 1,
        _ => q,
    };
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// The whole state of one drill session.
///
/// Owned by the host and handed to every operation; nothing here reads a
/// global. Replaced wholesale on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    config: SessionConfig,
    phase: Phase,
    attempted: u32,
    correct_count: u32,
    progress: Progress,
    current_problem: Problem,
    problem_number: u64,
    last_feedback: Option<Outcome>,
}

impl SessionState {
    /// Start (or restart) a session with its first problem already drawn.
    pub fn start(config: SessionConfig, first_problem: Problem, now: DateTime<Utc>) -> Self {
        let progress = match config.length {
            SessionLength::Count(target) => Progress::Remaining(target),
            SessionLength::Timed { secs } => {
                Progress::Deadline(now + Duration::seconds(i64::from(secs)))
            }
        };
        tracing::info!(
            category = %config.category,
            difficulty = %config.difficulty,
            ?progress,
            "session started"
        );

        let mut state = Self {
            config,
            phase: Phase::Active,
            attempted: 0,
            correct_count: 0,
            progress,
            current_problem: first_problem,
            problem_number: 1,
            last_feedback: None,
        };
        // a zero count or an elapsed deadline finishes immediately
        state.poll(now);
        state
    }

    /// Whether the termination condition holds at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.progress {
            Progress::Remaining(remaining) => remaining == 0,
            Progress::Deadline(deadline) => now >= deadline,
        }
    }

    /// Level-triggered expiry check; repeated calls are harmless.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        if self.phase == Phase::Active && self.is_due(now) {
            self.finish();
        }
    }

    /// Finish the session now, whatever its progress.
    pub fn finish(&mut self) {
        if self.phase == Phase::Finished {
            return;
        }
        self.phase = Phase::Finished;
        let summary = self.summary();
        tracing::info!(
            correct = summary.correct,
            attempted = summary.attempted,
            percentage = summary.percentage,
            "session finished"
        );
    }

    pub(crate) fn install_problem(&mut self, problem: Problem) {
        self.current_problem = problem;
        self.problem_number += 1;
    }

    pub(crate) fn set_feedback(&mut self, outcome: Option<Outcome>) {
        self.last_feedback = outcome;
    }

    pub(crate) fn count_attempt(&mut self, correct: bool) {
        self.attempted += 1;
        if correct {
            self.correct_count += 1;
            if let Progress::Remaining(remaining) = &mut self.progress {
                *remaining = remaining.saturating_sub(1);
            }
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_counts(self.correct_count, self.attempted)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Correct answers still needed (count-bounded sessions only).
    pub fn remaining(&self) -> Option<u32> {
        match self.progress {
            Progress::Remaining(r) => Some(r),
            Progress::Deadline(_) => None,
        }
    }

    /// Time left before the deadline, never negative (time-bounded only).
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.progress {
            Progress::Deadline(deadline) => Some((deadline - now).max(Duration::zero())),
            Progress::Remaining(_) => None,
        }
    }

    pub fn current_problem(&self) -> &Problem {
        &self.current_problem
    }

    /// Increases by one each time a new problem is installed.
    pub fn problem_number(&self) -> u64 {
        self.problem_number
    }

    pub fn last_feedback(&self) -> Option<Outcome> {
        self.last_feedback
    }
}
