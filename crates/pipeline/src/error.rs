//! Pipeline error types
//!
//! Errors returned by entry handlers, and the ordered aggregation used by
//! stages that perform several downstream calls for one input.

use thiserror::Error;

/// Errors a downstream entry handler can return
#[derive(Debug, Error)]
pub enum HandleError {
    /// I/O failure while writing the entry out
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downstream component rejected the entry
    #[error("downstream handler failed: {0}")]
    Downstream(String),

    /// The handler has been stopped and accepts no further entries
    #[error("handler is closed")]
    Closed,

    /// Several downstream calls failed during one operation
    #[error("{}", join_errors(.0))]
    Multiple(Vec<HandleError>),
}

impl HandleError {
    /// Create a downstream error
    pub fn downstream(msg: impl Into<String>) -> Self {
        Self::Downstream(msg.into())
    }
}

fn join_errors(errors: &[HandleError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered accumulation of handler errors
///
/// A single input line may fan out into several downstream calls. Failures
/// must not abort the remaining calls, so stages collect every error here and
/// report them together once the operation finishes.
///
/// # Example
///
/// ```ignore
/// let mut errs = MultiError::new();
/// errs.add(sink.handle(&labels, ts, "first").await);
/// errs.add(sink.handle(&labels, ts, "second").await);
/// errs.into_result()?;
/// ```
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<HandleError>,
}

impl MultiError {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one downstream call; `Ok` is ignored
    pub fn add(&mut self, result: Result<(), HandleError>) {
        if let Err(err) = result {
            self.errors.push(err);
        }
    }

    /// Record an error directly
    pub fn push(&mut self, err: HandleError) {
        self.errors.push(err);
    }

    /// Whether any error has been recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapse into a single result
    ///
    /// `Ok(())` when nothing failed, the sole error when exactly one call
    /// failed, and [`HandleError::Multiple`] otherwise.
    pub fn into_result(mut self) -> Result<(), HandleError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(HandleError::Multiple(self.errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        assert!(MultiError::new().into_result().is_ok());
    }

    #[test]
    fn test_single_error_passes_through() {
        let mut errs = MultiError::new();
        errs.add(Err(HandleError::Closed));
        errs.add(Ok(()));
        let err = errs.into_result().unwrap_err();
        assert!(matches!(err, HandleError::Closed));
    }

    #[test]
    fn test_multiple_errors_joined() {
        let mut errs = MultiError::new();
        errs.push(HandleError::downstream("first"));
        errs.push(HandleError::Closed);
        assert_eq!(errs.len(), 2);

        let err = errs.into_result().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("first"));
        assert!(msg.contains("closed"));
        assert!(msg.contains("; "));
    }
}
