use thiserror::Error;

/// Schema construction failures. Always fatal, always surfaced before any
/// record is processed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown namespace prefix '{prefix}' in selector '{selector}'")]
    UnknownPrefix { prefix: String, selector: String },

    #[error("empty step in selector '{0}'")]
    EmptyStep(String),

    #[error("malformed attribute predicate in selector '{0}'")]
    BadPredicate(String),

    #[error("malformed attribute reference in selector '{0}'")]
    BadAttribute(String),

    #[error("selector '{0}' has no steps")]
    EmptySelector(String),
}

/// Per-record failures. Isolated to one record; the stream continues.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has no extractable application identifier")]
    MissingIdentifier,

    #[error("identifier '{0}' is too short to slice")]
    MalformedIdentifier(String),
}

/// Record source failures: I/O or XML event errors. These abort the stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input inside a record")]
    TruncatedRecord,
}
