use std::io;
use std::path::PathBuf;

use crate::parser::AnnotationError;

/// 生成过程中的错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required argument `--{0}`")]
    MissingArgument(&'static str),

    #[error("invalid argument `--{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("{} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to parse {}: {source}", .path.display())]
    SourceParse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error("struct `{name}` not found in {}", .path.display())]
    TypeNotFound { name: String, path: PathBuf },

    #[error("malformed annotation on field `{field}`: {source}")]
    MalformedAnnotation {
        field: String,
        #[source]
        source: AnnotationError,
    },

    #[error("invalid table `{table}`: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// 每种错误对应一个独立的非零退出码
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::MissingArgument(_) => 2,
            Error::InvalidArgument { .. } => 3,
            Error::FileNotFound(_) => 4,
            Error::SourceParse { .. } => 5,
            Error::TypeNotFound { .. } => 6,
            Error::MalformedAnnotation { .. } => 7,
            Error::InvalidTable { .. } => 8,
            Error::Io { .. } => 9,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
