use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Lambda source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Invalid source path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] glob::GlobError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// What the user can do about it, when there is something
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BuildError::SourceNotFound(_) => Some(
                "Run `sapling scaffold` first, or create the directory and put \
                 your handler module in it",
            ),
            _ => None,
        }
    }

    /// Message with a hint for the user
    pub fn user_message(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n\n{}.", self, hint),
            None => self.to_string(),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
