use thiserror::Error;

/// Failures the extraction pipeline can encounter.
///
/// None of these escape the public extraction API: an unrecognized file
/// degrades to an empty result set and a malformed fragment is dropped while
/// the remaining matches are kept. The variants exist so the pipeline can
/// log precisely what was skipped.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No engine pattern matched the input at all.
    #[error("no known engine pattern matched the input")]
    UnrecognizedFormat,

    /// A marker region was found but its content failed structural parsing.
    #[error("malformed plan fragment: {reason}")]
    MalformedFragment { reason: String },
}

impl ExtractError {
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        ExtractError::MalformedFragment {
            reason: err.to_string(),
        }
    }
}
