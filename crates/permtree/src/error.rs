//! Codec error types.
//!
//! Read-only queries on a [`PermissionSet`] never fail; every error in this
//! crate comes from one of the two codecs. All decode errors are returned to
//! the immediate caller, with no retries and no partial recovery; a
//! partially-decoded structure must be discarded.
//!
//! [`PermissionSet`]: crate::PermissionSet

use thiserror::Error;

/// Error produced by the binary and structured codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A fixed-width integer slot or a declared payload extends past the
    /// end of the input.
    #[error("binary buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes the read required, counted from the start of the input.
        needed: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// A variable-length integer did not fit its 8-byte slot.
    ///
    /// Frame integers (identifier, sizes, child indices) are limited to
    /// 56 bits by the slot width; this fires both when encoding a larger
    /// value and when a decoded slot has no terminating byte.
    #[error("64-bit varint overflow in slot at offset {offset}")]
    Overflow {
        /// Byte offset of the offending slot.
        offset: usize,
    },

    /// A structured-codec child key is not a decimal bit index.
    #[error("invalid child index key '{key}'")]
    InvalidChildIndex {
        /// The key as it appeared in the envelope.
        key: String,
    },

    /// The structured-codec bit-vector payload is not valid base64.
    #[error("malformed bit-vector payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The structured-codec envelope is not valid JSON.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_too_small_display() {
        let err = CodecError::BufferTooSmall { needed: 8, got: 3 };
        let msg = err.to_string();
        assert!(msg.contains("needed 8"), "got: {msg}");
        assert!(msg.contains("got 3"), "got: {msg}");
    }

    #[test]
    fn overflow_display() {
        let err = CodecError::Overflow { offset: 16 };
        assert!(err.to_string().contains("offset 16"));
    }

    #[test]
    fn invalid_child_index_display() {
        let err = CodecError::InvalidChildIndex {
            key: "banana".to_string(),
        };
        assert!(err.to_string().contains("banana"));
    }
}
