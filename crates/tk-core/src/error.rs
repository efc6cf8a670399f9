use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    MalformedPath { path: String, reason: &'static str },
    MalformedTransform(String),
    InvalidNumber { what: &'static str, value: String },
    MissingAttribute { element: &'static str, attribute: &'static str },
    InvalidStage { operation: &'static str, stage: &'static str },
    EmptyPath,
    SizeMismatch { expected: usize, actual: usize },
    UnknownLayer(String),
    Xml(String),
    Encoding(String),
    UnexpectedRoot { expected: &'static str, actual: String },
    MalformedRecord { layer: String, reason: String },
    Io { kind: std::io::ErrorKind, message: String },
    WorkerPool(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPath { path, reason } => {
                write!(f, "malformed path '{path}': {reason}")
            }
            Self::MalformedTransform(t) => write!(f, "malformed transform '{t}'"),
            Self::InvalidNumber { what, value } => {
                write!(f, "invalid number for {what}: '{value}'")
            }
            Self::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing attribute '{attribute}'")
            }
            Self::InvalidStage { operation, stage } => {
                write!(f, "{operation} is not valid for a boundary in stage {stage}")
            }
            Self::EmptyPath => write!(f, "boundary path is empty"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::UnknownLayer(name) => write!(f, "unknown layer '{name}'"),
            Self::Xml(msg) => write!(f, "xml error: {msg}"),
            Self::Encoding(msg) => write!(f, "encoding error: {msg}"),
            Self::UnexpectedRoot { expected, actual } => {
                write!(f, "expected root element <{expected}>, got <{actual}>")
            }
            Self::MalformedRecord { layer, reason } => {
                write!(f, "malformed adjacency record in layer '{layer}': {reason}")
            }
            Self::Io { kind, message } => write!(f, "io error ({kind}): {message}"),
            Self::WorkerPool(msg) => write!(f, "failed to start worker pool: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
