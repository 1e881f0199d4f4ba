//! The operations a host (terminal UI, tests) drives a session with.

use crate::catalog::UnitCatalog;
use crate::error::{DrillError, InvalidStateError};
use crate::evaluator;
use crate::problem::{self, Problem};
use crate::session::{Outcome, SessionConfig, SessionState};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::cell::Cell;

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Catalog, clock and randomness shared by every session operation.
///
/// The session itself stays with the caller; every call takes it by
/// `&mut` and either applies a whole transition or leaves it as it was.
#[derive(Debug)]
pub struct Drill<C: Clock, R: Rng> {
    catalog: UnitCatalog,
    clock: C,
    rng: R,
}

impl Drill<SystemClock, ThreadRng> {
    pub fn with_system_clock(catalog: UnitCatalog) -> Self {
        Self::new(catalog, SystemClock, rand::thread_rng())
    }
}

impl<C: Clock, R: Rng> Drill<C, R> {
    pub fn new(catalog: UnitCatalog, clock: C, rng: R) -> Self {
        Self {
            catalog,
            clock,
            rng,
        }
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn next_problem(&mut self, config: &SessionConfig) -> Result<Problem, DrillError> {
        problem::generate(
            &self.catalog,
            &config.category,
            &config.allowed_units,
            config.difficulty,
            &mut self.rng,
        )
    }

    /// Validate `config` and start a fresh session with its first problem.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<SessionState, DrillError> {
        config.validate(&self.catalog)?;
        let first = self.next_problem(&config)?;
        Ok(SessionState::start(config, first, self.clock.now()))
    }

    /// Apply the expiry check. Call before every display.
    pub fn poll_expiry(&self, state: &mut SessionState) {
        state.poll(self.clock.now());
    }

    pub fn submit_answer(
        &mut self,
        state: &mut SessionState,
        raw: &str,
    ) -> Result<Outcome, DrillError> {
        self.poll_expiry(state);
        let config = state.config().clone();
        evaluator::evaluate(state, raw, || self.next_problem(&config))
    }

    /// Skip the current problem. Counters are not touched.
    pub fn request_new_problem(&mut self, state: &mut SessionState) -> Result<(), DrillError> {
        self.poll_expiry(state);
        if !state.is_active() {
            return Err(InvalidStateError::SessionFinished.into());
        }
        let config = state.config().clone();
        let problem = self.next_problem(&config)?;
        state.install_problem(problem);
        state.set_feedback(None);
        tracing::debug!(problem = state.problem_number(), "problem skipped");
        Ok(())
    }

    pub fn time_remaining(&self, state: &SessionState) -> Option<Duration> {
        state.time_remaining(self.clock.now())
    }
}
