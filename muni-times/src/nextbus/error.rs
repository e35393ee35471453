//! NextBus feed error types.

/// Errors fetching the raw feed body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed endpoint answered with a non-success status
    #[error("feed returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Base URL in the configuration is not a valid URL
    #[error("invalid feed URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Local fixture data could not be served
    #[error("fixture error: {message}")]
    Fixture { message: String },
}

/// A well-formed document that does not look like a predictions response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The response body was blank
    #[error("document is empty")]
    EmptyDocument,

    /// The root element is not `<body>`
    #[error("expected <body> root element")]
    MissingBody,

    /// A required attribute is absent
    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A numeric attribute could not be parsed
    #[error("<{element}> attribute {attribute:?} is not a valid number: {value:?}")]
    InvalidNumber {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// Errors turning a raw feed body into a schedule.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Body is not well-formed XML
    #[error("malformed feed XML: {0}")]
    Parse(#[from] quick_xml::DeError),

    /// Feed reported an upstream error instead of predictions
    #[error("feed reported an error: {0}")]
    Feed(String),

    /// XML is well-formed but has an unexpected shape
    #[error("unexpected feed shape: {0}")]
    Shape(#[from] ShapeError),
}
