#![forbid(unsafe_code)]

use thiserror::Error;
use tv_core::entities::TagValuePair;
use tv_core::ids::FileId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unknown id")]
    UnknownId,
    #[error("no such implication ({implying} => {implied})")]
    NoSuchImplication {
        implying: TagValuePair,
        implied: TagValuePair,
    },
    #[error("no such file tag (file={file_id}, {pair})")]
    NoSuchFileTag { file_id: FileId, pair: TagValuePair },
    #[error("tag already exists: {0}")]
    TagAlreadyExists(String),
    #[error("value already exists: {0}")]
    ValueAlreadyExists(String),
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<StoreError>,
    },
    /// A condition the schema guarantees can never occur. Not recoverable.
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

impl StoreError {
    /// True for unrecoverable defects as opposed to expected failure modes.
    pub fn is_defect(&self) -> bool {
        match self {
            Self::Invariant(_) => true,
            Self::Context { source, .. } => source.is_defect(),
            _ => false,
        }
    }
}

pub trait StoreResultExt<T> {
    /// Annotates an error with the operation it came from.
    fn context_with(self, context: impl FnOnce() -> String) -> Result<T, StoreError>;
}

impl<T, E: Into<StoreError>> StoreResultExt<T> for Result<T, E> {
    fn context_with(self, context: impl FnOnce() -> String) -> Result<T, StoreError> {
        self.map_err(|err| StoreError::Context {
            context: context(),
            source: Box::new(err.into()),
        })
    }
}
