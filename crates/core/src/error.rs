//! Error types for the gravity-points core.

use thiserror::Error;

/// Errors produced while configuring or running a simulation.
///
/// The physics itself is total: force evaluation and integration never fail.
/// Everything here comes from user-supplied configuration or from I/O at the
/// edges (scene files, snapshots).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A parameter was present and well-typed but outside its allowed range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// No theme is registered under this name.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// No simulation variant is registered under this name.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// Reading a scene or writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParam {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_param_includes_name_and_reason() {
        let err = EngineError::invalid_param("exponent", "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("exponent"), "missing name in: {msg}");
        assert!(msg.contains("must be positive"), "missing reason in: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = EngineError::ParamTypeMismatch {
            name: "damping".into(),
            expected: "number".into(),
            got: "string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("damping"), "missing param name in: {msg}");
        assert!(msg.contains("number"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn unknown_variant_includes_name() {
        let msg = EngineError::UnknownVariant("warp".into()).to_string();
        assert!(msg.contains("warp"), "missing variant in: {msg}");
    }

    #[test]
    fn io_includes_message() {
        let msg = EngineError::Io("disk full".into()).to_string();
        assert!(msg.contains("disk full"), "missing message in: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
