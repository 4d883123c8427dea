// Error taxonomy for a generation run.
// Every variant is fatal: the run aborts and no autocomplete file is written.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The catalog source could not be read at all.
    #[error("enumeration failed: {0}")]
    Enumeration(String),

    /// One callable's parameter list could not be introspected.
    #[error("reflection failed for `{function}`: {message}")]
    Reflection { function: String, message: String },

    /// The sink could not write the artifact.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn reflection(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reflection { function: function.into(), message: message.into() }
    }

    /// Short name of the pipeline stage that failed, used in CLI diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Enumeration(_) => "enumerate",
            Self::Reflection { .. } => "reflect",
            Self::Write { .. } => "write",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
