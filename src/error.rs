//! Error types for the animation core.
//!
//! Most problems in the animation pipeline degrade locally: a missing
//! optional texture is skipped, an out-of-range child sample is ignored, a
//! non-finite hit box is dropped. [`AnimError`] names each of those kinds so
//! the places that do report them (partial loads, log lines, the renderer
//! constructor) agree on one vocabulary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, parsing, or rendering animations.
#[derive(Debug, Error)]
pub enum AnimError {
    /// A required PNG for a frame variant could not be loaded.
    #[error("Missing texture: {}", path.display())]
    MissingTexture {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A JSON payload is not an object or lacks the expected shape.
    #[error("Malformed animation payload: {reason}")]
    MalformedPayload {
        /// What was wrong with the payload.
        reason: String,
    },

    /// A child sample referenced a child slot that does not exist.
    #[error("Child index {index} out of range (children: {len})")]
    OutOfRangeChildIndex {
        /// Offending index.
        index: i32,
        /// Number of child names on the animation.
        len: usize,
    },

    /// A slot with a negative child index was asked to do work.
    #[error("Child slot {slot} is inactive")]
    InactiveSlot {
        /// Position of the slot in the attachment list.
        slot: usize,
    },

    /// A hit box or attack vector carried NaN or infinite values.
    #[error("Non-finite geometry dropped: {what}")]
    NonFiniteGeometry {
        /// Description of the dropped entry.
        what: String,
    },

    /// One of the on-end keywords was used as a real animation name.
    #[error("'{name}' is a reserved animation name")]
    ReservedAnimationName {
        /// The rejected name.
        name: String,
    },

    /// The scene renderer was built without a draw target.
    #[error("Scene renderer requires a draw target, none was provided")]
    MissingRenderer,

    /// The scene renderer was built without a texture store.
    #[error("Scene renderer requires a texture store, none was provided")]
    MissingTextureStore,

    /// Writing a document or config back to disk failed.
    #[error("Failed to save {}: {reason}", path.display())]
    SaveFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// IO error
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type AnimResult<T> = Result<T, AnimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_prerequisite_messages_differ() {
        let a = AnimError::MissingRenderer.to_string();
        let b = AnimError::MissingTextureStore.to_string();
        assert_ne!(a, b);
        assert!(a.contains("draw target"));
        assert!(b.contains("texture store"));
    }

    #[test]
    fn test_missing_texture_names_path() {
        let e = AnimError::MissingTexture {
            path: PathBuf::from("cache/hero/animations/scale_100/normal/0.png"),
        };
        assert!(e.to_string().contains("scale_100/normal/0.png"));
    }
}
