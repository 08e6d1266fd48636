use thiserror::Error;

/// Stage of a guide refresh, used to point diagnostics at the right place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideStage {
    /// Retrieving the document over HTTP
    Fetch,
    /// Inflating a gzip payload
    Decompress,
    /// Scanning the XMLTV document
    Parse,
    /// Reading or writing the on-disk schedule cache
    Cache,
}

impl std::fmt::Display for GuideStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl GuideStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            GuideStage::Fetch => "Fetch",
            GuideStage::Decompress => "Decompress",
            GuideStage::Parse => "Parse",
            GuideStage::Cache => "Cache",
        }
    }

    /// Get actionable suggestion for fixing the issue at this stage
    pub fn suggestion(&self) -> &'static str {
        match self {
            GuideStage::Fetch => "Check the EPG URL and your connection. Channel browsing still works without a guide.",
            GuideStage::Decompress => "The .gz guide is truncated or corrupt. Try the plain XML URL from your provider.",
            GuideStage::Parse => "The guide is not valid XMLTV. This is usually a provider issue. Try again later.",
            GuideStage::Cache => "Delete the cached guide and refresh.",
        }
    }
}

/// Errors raised while fetching, decoding or caching guide data
#[derive(Debug, Error)]
pub enum GuideError {
    /// Transport-level failure (DNS, TLS, timeout, body read)
    #[error("Request to {0} failed: {1}")]
    Http(String, String),

    /// Server answered with a non-success status
    #[error("Server returned {0} for {1}")]
    HttpStatus(u16, String),

    /// Gzip payload could not be inflated
    #[error("Failed to decompress guide: {0}")]
    Decompress(String),

    /// XML syntax error; the whole document is rejected
    #[error("XML error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The blocking parse worker panicked or was cancelled
    #[error("Parse worker failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl GuideError {
    pub fn stage(&self) -> GuideStage {
        match self {
            GuideError::Http(..) | GuideError::HttpStatus(..) => GuideStage::Fetch,
            GuideError::Decompress(_) => GuideStage::Decompress,
            GuideError::Parse { .. } | GuideError::Worker(_) => GuideStage::Parse,
            GuideError::Io(_) | GuideError::Cache(_) => GuideStage::Cache,
        }
    }

    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        let stage = self.stage();
        format!(
            "{} Error\nError: {}\nSuggestion: {}",
            stage.display_name(),
            self,
            stage.suggestion()
        )
    }
}
