use thiserror::Error;

/// User input that is not a decimal number. Always recovered into feedback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no number was entered")]
    Empty,

    #[error("not a decimal number: {0:?}")]
    Invalid(String),
}

/// Catalog or session configuration that cannot be used. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unit catalog file not found: {0}")]
    MissingCatalog(String),

    #[error("unit catalog is not valid JSON: {0}")]
    MalformedCatalog(#[from] serde_json::Error),

    #[error("duplicate category {0:?} in unit catalog")]
    DuplicateCategory(String),

    #[error("category {category:?} needs at least two units, found {found}")]
    TooFewUnits { category: String, found: usize },

    #[error("unit {unit:?} listed twice in category {category:?}")]
    DuplicateUnit { category: String, unit: String },

    #[error("units in category {category:?} share exponent {exponent}")]
    DuplicateExponent { category: String, exponent: i32 },

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("unit {unit:?} has no catalog entry in category {category:?}")]
    UnknownUnit { category: String, unit: String },

    #[error("a count-bounded session needs at least one question")]
    ZeroQuestionCount,

    #[error("a time-bounded session needs a positive duration")]
    ZeroDuration,
}

/// A call that violates the session contract (caller bug, not user error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("the session is finished; start a new one first")]
    SessionFinished,

    #[error("category {category:?} has fewer than two usable units")]
    NotEnoughUnits { category: String },
}

#[derive(Debug, Error)]
pub enum DrillError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}
