use thiserror::Error;

/// Everything that can go wrong while decoding, transforming or encoding one
/// file. Errors are local to that file; callers report them and carry on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file type: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode {format}: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no file loaded with id {0}")]
    UnknownFile(usize),
}

impl From<calamine::XlsxError> for PipelineError {
    fn from(err: calamine::XlsxError) -> Self {
        PipelineError::Excel(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for PipelineError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        PipelineError::Encode {
            format: "Excel",
            reason: err.to_string(),
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
