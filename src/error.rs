use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong around a spin. None of these are fatal:
/// each one degrades to a visible, non-blocking state in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    #[error("select a level before spinning")]
    NoCategorySelected,

    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("invalid duration input: {input:?}")]
    InvalidDurationInput { input: String },
}
