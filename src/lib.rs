// Library surface for the binary, headless/integration tests and reuse.
// Rendering and key bindings live in the binary.
pub mod app_dirs;
pub mod catalog;
pub mod celebration;
pub mod config;
pub mod decimal;
pub mod drill;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod problem;
pub mod runtime;
pub mod session;

pub use drill::{Clock, Drill, ManualClock, SystemClock};
pub use error::{ConfigError, DrillError, InvalidStateError, ParseError};
pub use session::{Outcome, Phase, SessionConfig, SessionLength, SessionState};
