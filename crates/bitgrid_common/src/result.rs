//! Common result and error types for the BitGrid toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in this
/// implementation), not a user-facing error. User-facing conditions are
/// reported through `bitgrid_diagnostics` and the operation still returns
/// `Ok`.
pub type BitResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the implementation, not a problem
/// with user input.
///
/// These should never occur during normal operation. If one does occur, it
/// means an invariant this crate is supposed to maintain (e.g. "every cell a
/// routing pass claims to have inserted actually exists afterward") was
/// violated.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("missing cell after routing");
        assert_eq!(format!("{err}"), "internal error: missing cell after routing");
    }

    #[test]
    fn ok_path() {
        let r: BitResult<i32> = Ok(42);
        assert!(r.is_ok());
        assert_eq!(r.ok(), Some(42));
    }

    #[test]
    fn err_path() {
        let r: BitResult<i32> = Err(InternalError::new("test error"));
        assert!(r.is_err());
        assert_eq!(r.err().unwrap().message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
