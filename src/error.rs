use std::path::PathBuf;

/// Errors raised while loading a sample on the control thread.
///
/// None of these ever reach the audio thread; a failed load leaves the
/// previously loaded sample in place.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported sample format: {0}")]
    Unsupported(PathBuf),

    #[error("Sample contains no audio: {0}")]
    Empty(PathBuf),

    #[error("No sample slot {slot} on part {part}")]
    NoSuchSlot { part: usize, slot: usize },
}

/// Errors raised while saving or restoring a kit.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[cfg(feature = "serde")]
    #[error("Kit state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported kit state version {0}")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
