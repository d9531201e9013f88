//! Error taxonomy.
//!
//! Two families, and nothing else:
//! - [`InputError`]: a caller handed the engines something malformed (bad rank
//!   permutation, unknown identifier, missing weight, too many "unsure" answers).
//!   Always surfaced; the only silent normalizations in the crate are the
//!   "unsure" no-op and clamping adjusted scores into `[1, 6]`.
//! - [`ConfigError`]: the reference tables are inconsistent. Fatal at startup.
//!
//! Nothing here retries. Re-prompting a user belongs to whatever sits in front
//! of the library.

/// Malformed caller input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("unknown clarifying question {0}; answer only the questions in the loaded tables")]
    UnknownQuestion(u32),

    #[error("clarifying question {0} was not answered")]
    MissingAnswer(u32),

    #[error("clarifying question {0} was answered more than once")]
    DuplicateAnswer(u32),

    #[error("{count} questions answered \"unsure\"; at most {max} are allowed")]
    TooManyUnsure { count: usize, max: usize },

    #[error("unknown criterion {0:?}")]
    UnknownCriterion(String),

    #[error("criterion {0:?} has no importance rank")]
    MissingRank(String),

    #[error("criterion {criterion:?} ranked {rank}; ranks must lie in 1..={max}")]
    RankOutOfRange { criterion: String, rank: u8, max: u8 },

    #[error("importance rank {0} was used more than once")]
    DuplicateRank(u8),

    #[error("weighting profile {profile:?} has no weight for criterion {criterion:?}")]
    MissingWeight { profile: String, criterion: String },

    #[error("weighting profile {profile:?} gives criterion {criterion:?} weight {weight}; weights must be finite and non-negative")]
    InvalidWeight {
        profile: String,
        criterion: String,
        weight: f64,
    },

    #[error("unknown weighting profile {0:?}")]
    UnknownProfile(String),

    #[error("{name} = {value} is not a usable probability")]
    InvalidProbability { name: &'static str, value: f64 },
}

/// Inconsistent reference tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{table} table has {found} entries, expected {expected}")]
    Cardinality {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{table} table declares {id:?} more than once")]
    DuplicateId { table: &'static str, id: String },

    #[error("no baseline score for scheme {scheme:?}, criterion {criterion:?}")]
    MissingBaseline { scheme: String, criterion: String },

    #[error("baseline score {score} for scheme {scheme:?}, criterion {criterion:?} is outside 1..=6")]
    BaselineOutOfRange {
        scheme: String,
        criterion: String,
        score: u8,
    },

    #[error("question {question} references unknown {kind} {id:?}")]
    UnknownReference {
        question: u32,
        kind: &'static str,
        id: String,
    },

    #[error("{table} index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    #[error("weighting profile {profile:?} is unusable: {source}")]
    Profile {
        profile: String,
        #[source]
        source: InputError,
    },
}

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl Error {
    /// True for caller-input problems (recoverable by asking again).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// True for table problems (fatal at startup).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_identifier() {
        let e: Error = InputError::UnknownQuestion(12).into();
        assert!(e.is_invalid_input());
        assert!(e.to_string().contains("12"), "{e}");

        let e: Error = ConfigError::Cardinality {
            table: "schemes",
            expected: 6,
            found: 5,
        }
        .into();
        assert!(e.is_configuration());
        assert_eq!(
            e.to_string(),
            "configuration error: schemes table has 5 entries, expected 6"
        );
    }

    #[test]
    fn profile_error_keeps_its_source() {
        use std::error::Error as _;
        let e = ConfigError::Profile {
            profile: "weighting2".to_string(),
            source: InputError::MissingWeight {
                profile: "weighting2".to_string(),
                criterion: "C".to_string(),
            },
        };
        assert!(e.source().is_some());
    }
}
