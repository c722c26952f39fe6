use thiserror::Error;

/// Errors surfaced by the data store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. concurrent creation of
    /// the same ingredient name). Recoverable by re-reading.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other store failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during a recipe import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Malformed input: bad URL, unsafe URL, or a recipe without a source URL
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Caller could not be resolved to a household
    #[error("unauthenticated")]
    Unauthorized,

    /// Household or recipe not found
    #[error("not found: {0}")]
    NotFound(String),

    /// A recipe with the same name already exists in the household
    #[error("conflict: {0}")]
    Conflict(String),

    /// Page fetch failed: network error, timeout, or non-2xx status
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The completion service response could not be parsed as a recipe.
    /// Fatal to the run; no result can be produced.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Persistence failure that could not be recovered locally
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP client error (provider or fetcher plumbing)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ImportError {
    /// HTTP status code for embedding callers. Non-HTTP callers can match
    /// on the variants directly.
    pub fn status_code(&self) -> u16 {
        match self {
            ImportError::BadRequest(_) => 400,
            ImportError::Unauthorized => 401,
            ImportError::NotFound(_) => 404,
            ImportError::Conflict(_) => 409,
            ImportError::Fetch(_)
            | ImportError::Extraction(_)
            | ImportError::Store(_)
            | ImportError::Http(_)
            | ImportError::Config(_) => 500,
        }
    }
}
