//! Structured (human-inspectable) codec.
//!
//! Serializes a [`PermissionSet`] node as a JSON envelope:
//!
//! ```json
//! {"id": 42, "bits": "AAAA...", "children": {"5": "{\"id\":0,...}"}}
//! ```
//!
//! - `bits` is the bit vector's self-describing encoding
//!   ([`BitVec::to_bytes`]) wrapped in base64.
//! - `children` maps the decimal string of each child *index* to that
//!   child's envelope embedded as a JSON **string** (an encoded document,
//!   not a nested object). The field is omitted entirely when the node has
//!   no children; decoders treat absence as "no children".
//!
//! Decoding is strict: a malformed envelope, payload, child key, or child
//! document fails the whole decode rather than silently dropping grants.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::bits::BitVec;
use crate::error::CodecError;
use crate::set::PermissionSet;

/// On-the-wire shape of one node.
#[derive(Serialize, Deserialize)]
struct Envelope {
    id: u64,
    bits: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<BTreeMap<String, String>>,
}

impl PermissionSet {
    /// Encodes this set (and its whole subtree) as a JSON document.
    ///
    /// Children are keyed by the decimal string of their bit index and
    /// embedded as encoded strings; a set with no children omits the
    /// `children` field entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if the envelope cannot be serialized.
    ///
    /// # Example
    ///
    /// ```
    /// use permtree::PermissionSet;
    ///
    /// let mut perms = PermissionSet::with_id(42);
    /// perms.set(&[5]);
    ///
    /// let text = perms.to_json().expect("encode");
    /// let back = PermissionSet::from_json(&text).expect("decode");
    /// assert_eq!(back, perms);
    /// ```
    pub fn to_json(&self) -> Result<String, CodecError> {
        let children = if self.children.is_empty() {
            None
        } else {
            let mut entries = BTreeMap::new();
            for (index, child) in &self.children {
                entries.insert(index.to_string(), child.to_json()?);
            }
            Some(entries)
        };
        let envelope = Envelope {
            id: self.id,
            bits: STANDARD.encode(self.bits.to_bytes()),
            children,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Decodes a JSON document produced by [`to_json`](Self::to_json).
    ///
    /// An absent `children` field decodes as "no children" and is never an
    /// error.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Json`]: the envelope is not valid JSON or is
    ///   missing required fields.
    /// - [`CodecError::Base64`] / [`CodecError::BufferTooSmall`]: the bit
    ///   vector payload fails its own decode.
    /// - [`CodecError::InvalidChildIndex`]: a child key is not a decimal
    ///   unsigned integer.
    /// - Any error from a child's recursive decode.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let mut set = PermissionSet::with_id(envelope.id);
        set.bits = BitVec::from_bytes(&STANDARD.decode(&envelope.bits)?)?;
        if let Some(entries) = envelope.children {
            for (key, value) in entries {
                let index: usize = key
                    .parse()
                    .map_err(|_| CodecError::InvalidChildIndex { key: key.clone() })?;
                set.children.insert(index, PermissionSet::from_json(&value)?);
            }
        }
        Ok(set)
    }
}
