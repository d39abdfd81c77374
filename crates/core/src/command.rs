//! Command contract for the per-aggregate façades.

use crate::error::{Error, Result};

/// A command carries intent into a per-aggregate façade.
///
/// Validation is deterministic and runs before any side effect; a failing
/// command never touches the repository, cache, or bus.
pub trait Command: core::fmt::Debug + Send + Sync {
    /// Stable command name (e.g. "user.create.command"), used in logs.
    fn name(&self) -> &'static str;

    /// Validate the command input, collecting every missing/malformed field.
    fn validate(&self) -> Result<()>;
}

/// Join collected field errors into a single validation error.
pub fn validation_errors(fields: Vec<String>) -> Result<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(fields.join("; ")))
    }
}
