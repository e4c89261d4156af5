//! Error taxonomy for fitting and for the command-line surface.
//!
//! Every numeric failure aborts the current call. Messages can be prefixed with
//! the operation that was being attempted via [`FitError::context`], which keeps
//! the variant intact so callers can still match on the failure kind.

use std::fmt::Display;

/// Errors produced while building, reducing or solving a regression.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    /// Malformed or missing arguments, non-finite coordinates, wrong-length vectors.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// An elimination pivot evaluated to (nearly) zero.
    #[error("Unstable system: {0}")]
    UnstableSystem(String),

    /// The exact solve met a rank-deficient design matrix.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// Fewer points than unknowns.
    #[error("Not enough points: {0}")]
    MissingPoints(String),

    /// More constraints than free dimensions.
    #[error("Overdetermined constraints: {0}")]
    OverdeterminedConstraint(String),

    /// A constraint entry could not be used.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FitError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        FitError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        FitError::Csv {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        FitError::Json {
            context: context.into(),
            source,
        }
    }

    /// Prefix the message with the operation that failed, keeping the variant.
    pub fn context(self, ctx: impl Display) -> Self {
        let wrap = |msg: String| format!("{ctx}: {msg}");
        match self {
            FitError::InputValidation(m) => FitError::InputValidation(wrap(m)),
            FitError::UnstableSystem(m) => FitError::UnstableSystem(wrap(m)),
            FitError::SingularSystem(m) => FitError::SingularSystem(wrap(m)),
            FitError::MissingPoints(m) => FitError::MissingPoints(wrap(m)),
            FitError::OverdeterminedConstraint(m) => FitError::OverdeterminedConstraint(wrap(m)),
            FitError::InvalidConstraint(m) => FitError::InvalidConstraint(wrap(m)),
            FitError::Io { context, source } => FitError::Io {
                context: wrap(context),
                source,
            },
            FitError::Csv { context, source } => FitError::Csv {
                context: wrap(context),
                source,
            },
            FitError::Json { context, source } => FitError::Json {
                context: wrap(context),
                source,
            },
        }
    }

    /// Process exit code used by the `regress` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InputValidation(_)
            | FitError::InvalidConstraint(_)
            | FitError::OverdeterminedConstraint(_)
            | FitError::Io { .. }
            | FitError::Csv { .. }
            | FitError::Json { .. } => 2,
            FitError::MissingPoints(_) => 3,
            FitError::UnstableSystem(_) | FitError::SingularSystem(_) => 4,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_variant_and_chains_message() {
        let err = FitError::UnstableSystem("pivot 0 at x=0".to_string())
            .context("point constraint #1")
            .context("exact fit");
        assert!(matches!(err, FitError::UnstableSystem(_)));
        assert_eq!(
            err.to_string(),
            "Unstable system: exact fit: point constraint #1: pivot 0 at x=0"
        );
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = FitError::io("Failed to open 'pts.csv'", io).context("fit");
        assert_eq!(err.to_string(), "I/O error: fit: Failed to open 'pts.csv': gone");
        let source = err.source().and_then(|s| s.downcast_ref::<std::io::Error>());
        assert_eq!(source.map(|e| e.kind()), Some(std::io::ErrorKind::NotFound));
        assert_eq!(err.exit_code(), 2);
    }
}
