pub type CalibResult<T> = Result<T, CalibError>;

#[derive(thiserror::Error, Debug)]
pub enum CalibError {
    #[error("format error: {0}")]
    Format(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("scene error: {0}")]
    Scene(String),

    /// Required data was absent mid-run. Validation should have caught this first.
    #[error("missing required data: {0}")]
    MissingData(String),

    /// The writer reported a non-OK status after `write()`; the target file is untrusted.
    #[error("error saving DNA: {0}")]
    WriteStatus(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CalibError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    pub fn write_status(msg: impl Into<String>) -> Self {
        Self::WriteStatus(msg.into())
    }

    /// `true` for errors that abort a calibration run after validation passed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingData(_) | Self::WriteStatus(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
