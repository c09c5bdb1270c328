//! An ordered, duplicate-free tag list.

use serde::{Deserialize, Serialize};

/// Tags on a chronicle. Order is kept for display but carries no meaning for
/// querying; a tag never appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
  pub fn new() -> Self { Self::default() }

  /// Add a tag. Surrounding whitespace is trimmed; empty and already-present
  /// tags are ignored. Returns whether the list changed.
  pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
    let tag = tag.as_ref().trim();
    if tag.is_empty() || self.contains(tag) {
      return false;
    }
    self.0.push(tag.to_owned());
    true
  }

  /// Remove a tag. Returns whether it was present.
  pub fn remove(&mut self, tag: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|t| t != tag);
    self.0.len() != before
  }

  pub fn contains(&self, tag: &str) -> bool { self.0.iter().any(|t| t == tag) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> std::slice::Iter<'_, String> { self.0.iter() }

  pub fn as_slice(&self) -> &[String] { &self.0 }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut tags = Self::new();
    for tag in iter {
      tags.insert(tag);
    }
    tags
  }
}

impl From<Vec<String>> for Tags {
  fn from(tags: Vec<String>) -> Self { tags.into_iter().collect() }
}

impl From<Tags> for Vec<String> {
  fn from(tags: Tags) -> Self { tags.0 }
}

impl<'a> IntoIterator for &'a Tags {
  type IntoIter = std::slice::Iter<'a, String>;
  type Item = &'a String;

  fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
