use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LibraryParseError {
    #[error("Failed to read library file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed library XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Unexpected <{0}> element in property list")]
    UnexpectedElement(String),

    #[error("Invalid {kind} value '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    #[error("Library is missing '{0}'")]
    MissingKey(&'static str),

    #[error("Dictionary key '{0}' has no value")]
    DanglingKey(String),
}
