use seedsmith_core::Error as CoreError;
use seedsmith_generate::GenerationError;

/// Library-wide error type.
///
/// Keeps analysis and generation failures distinct so callers can react accordingly.
#[derive(Debug)]
pub enum Error {
    /// Metadata could not be loaded or the descriptor set is inconsistent.
    Analysis(CoreError),
    /// A config named an unknown entity or an entity had nothing to emit.
    Generation(GenerationError),
}

/// Convenience alias for library results.
pub type Result<T> = std::result::Result<T, Error>;

impl From<CoreError> for Error {
    fn from(value: CoreError) -> Self {
        Error::Analysis(value)
    }
}

impl From<GenerationError> for Error {
    fn from(value: GenerationError) -> Self {
        Error::Generation(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Analysis(err) => write!(f, "analysis error: {err}"),
            Error::Generation(err) => write!(f, "generation error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Analysis(err) => Some(err),
            Error::Generation(err) => Some(err),
        }
    }
}
