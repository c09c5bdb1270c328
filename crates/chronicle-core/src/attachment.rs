//! Cover image and audio attachments.
//!
//! An attachment is either nothing, a persisted reference (a path or URL the
//! application resolves), or raw bytes still held in memory. The archive never
//! inspects the bytes.

use std::{fmt, sync::Arc};

use bytes::Bytes;

/// An opaque attachment slot on a chronicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Attachment {
  #[default]
  Absent,
  /// A stable reference, e.g. a file path or URL.
  Reference(String),
  /// Raw bytes not yet written anywhere stable.
  Payload(Payload),
}

impl Attachment {
  pub fn is_absent(&self) -> bool { matches!(self, Self::Absent) }

  pub fn reference(&self) -> Option<&str> {
    match self {
      Self::Reference(r) => Some(r),
      _ => None,
    }
  }

  pub fn payload(&self) -> Option<&Payload> {
    match self {
      Self::Payload(p) => Some(p),
      _ => None,
    }
  }
}

impl From<String> for Attachment {
  fn from(reference: String) -> Self { Self::Reference(reference) }
}

impl From<Payload> for Attachment {
  fn from(payload: Payload) -> Self { Self::Payload(payload) }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// An in-memory binary handle.
///
/// Clones share the same handle. Two payloads are equal only if one was
/// cloned from the other; byte contents and buffer addresses are never
/// compared, so separately created empty payloads stay distinct. Not `Hash`.
#[derive(Clone)]
pub struct Payload(Arc<Bytes>);

impl Payload {
  pub fn new(bytes: impl Into<Bytes>) -> Self { Self(Arc::new(bytes.into())) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn as_bytes(&self) -> &[u8] { &self.0 }

  /// The underlying buffer handle (shared, not copied).
  pub fn bytes(&self) -> Bytes { Bytes::clone(&self.0) }
}

impl PartialEq for Payload {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Payload {}

impl fmt::Debug for Payload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Payload({} bytes)", self.0.len())
  }
}
