//! Construction-time diagnostics
//!
//! Non-fatal findings about a key configuration are reported as
//! [`ConfigWarning`] values through an explicit [`Diagnostics`] sink that the
//! caller hands to the constructor. There is no global logger.

use std::fmt;

/// A non-fatal finding about a key configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Expired keys at these positions have no identifier and can only be
    /// used by the untagged fallback path
    ExpiredKeysWithoutIdentifier { positions: Vec<usize> },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::ExpiredKeysWithoutIdentifier { positions } => write!(
                f,
                "The encryption configuration has 'ExpiredKeys' defined however some keys have no 'KeyIdentifier' property value (positions {:?}). Verify if this is intentional.",
                positions
            ),
        }
    }
}

/// Sink for construction-time warnings
pub trait Diagnostics: Send + Sync {
    /// Report a warning
    fn warn(&self, warning: &ConfigWarning);
}

impl<F> Diagnostics for F
where
    F: Fn(&ConfigWarning) + Send + Sync,
{
    fn warn(&self, warning: &ConfigWarning) {
        self(warning)
    }
}

/// A sink that discards all warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn warn(&self, _warning: &ConfigWarning) {}
}

/// A sink that forwards warnings to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, warning: &ConfigWarning) {
        log::warn!("{}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_sink_receives_warnings() {
        let seen = Mutex::new(Vec::new());
        let sink = |w: &ConfigWarning| seen.lock().unwrap().push(w.clone());

        let warning = ConfigWarning::ExpiredKeysWithoutIdentifier { positions: vec![1] };
        sink.warn(&warning);
        NoopDiagnostics.warn(&warning);
        LogDiagnostics.warn(&warning);

        assert_eq!(seen.lock().unwrap().as_slice(), &[warning]);
    }

    #[test]
    fn test_warning_message() {
        let warning = ConfigWarning::ExpiredKeysWithoutIdentifier { positions: vec![0, 2] };
        let message = warning.to_string();
        assert!(message.contains("KeyIdentifier"));
        assert!(message.contains("[0, 2]"));
    }
}
