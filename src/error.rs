use thiserror::Error;

/// Failures that can occur while turning one page into a [`crate::PageRecord`].
///
/// Only [`ExtractError::Parse`], [`ExtractError::Render`] and [`ExtractError::Io`]
/// ever reach a caller of the pipeline. Isolation failures are recovered inside
/// the isolator and URL resolution never fails.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be parsed into a usable tree
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Readability cleaning failed
    #[error("content isolation failed: {0}")]
    Isolation(String),

    /// A configured URL is not an absolute URL
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The rendering service (page source or screenshot) failed
    #[error("rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub(crate) fn render(url: &str, message: impl ToString) -> Self {
        Self::Render {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}
