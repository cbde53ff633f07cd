use crate::core::interfaces::PreprocessorValidator;
use crate::utils::{Result, SokuError};

/// Rejects empty or NUL-containing registration arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentValidator;

impl ArgumentValidator {
    fn check(kind: &str, position: usize, name: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(SokuError::validation(format!(
                "{}() is missing required parameter {}: {}",
                kind, position, name
            )));
        }

        if value.contains('\0') {
            return Err(SokuError::validation(format!(
                "{}() parameter {} ({}) contains a NUL byte",
                kind, position, name
            )));
        }

        Ok(())
    }
}

impl PreprocessorValidator for ArgumentValidator {
    fn validate(&self, kind: &str, source: &str, output: &str) -> Result<()> {
        if kind.trim().is_empty() {
            return Err(SokuError::validation("preprocessor kind must not be empty"));
        }

        Self::check(kind, 1, "src", source)?;
        Self::check(kind, 2, "output", output)
    }
}
