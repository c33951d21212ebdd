use std::path::PathBuf;

/// Errors raised by corpus storage and resolution.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid corpus JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corpus file {path} has no questions array")]
    MissingQuestions { path: PathBuf },

    #[error("Unknown book id '{0}'")]
    UnknownBook(String),

    #[error("No corpus file found for book '{book}', chapter '{chapter}'")]
    ChapterNotFound { book: String, chapter: String },
}

impl CorpusError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CorpusError::Parse {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpusError>;
