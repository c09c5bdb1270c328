//! In-memory full-text index over chronicles.
//!
//! The index is a materialised view of the store: it holds nothing that
//! cannot be recomputed by re-indexing every stored record, and it is never
//! persisted.
//!
//! Every token of a record's search document is posted under each of its
//! prefixes ("forward" tokenisation), so a query token matches any indexed
//! token it is a prefix of. Prefixes are posted up to
//! [`MAX_POSTED_PREFIX`] characters; a longer query token is looked up by its
//! capped prefix and confirmed against the candidates' full tokens.

use std::collections::{HashMap, HashSet};

use chronicle_core::chronicle::{Chronicle, ChronicleId};

// ─── Document derivation ─────────────────────────────────────────────────────

/// Remove markup tags from `markup`, leaving a space where each tag was. An
/// unterminated `<` swallows the rest of the text.
pub fn strip_markup(markup: &str) -> String {
  let mut out = String::with_capacity(markup.len());
  let mut in_tag = false;
  for c in markup.chars() {
    match (in_tag, c) {
      (false, '<') => in_tag = true,
      (false, c) => out.push(c),
      (true, '>') => {
        in_tag = false;
        out.push(' ');
      }
      (true, _) => {}
    }
  }
  out
}

/// Lowercase `text` and split it on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
    .collect()
}

/// The text a record is searchable by: title, subtitle, stripped content,
/// tags and type, in that order.
pub fn search_document(record: &Chronicle) -> String {
  let tags = record
    .tags
    .iter()
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(" ");
  format!(
    "{} {} {} {} {}",
    record.title,
    record.subtitle,
    strip_markup(&record.content),
    tags,
    record.entry_type,
  )
}

/// Longest prefix, in characters, that gets its own posting.
pub const MAX_POSTED_PREFIX: usize = 32;

fn prefixes(token: &str) -> impl Iterator<Item = &str> {
  token
    .char_indices()
    .take(MAX_POSTED_PREFIX)
    .map(move |(i, c)| &token[..i + c.len_utf8()])
}

// ─── Index ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct IndexedDocument {
  /// Distinct full tokens → position of their first occurrence.
  tokens: HashMap<String, usize>,
  /// Monotonic indexing sequence; higher is more recent.
  seq:    u64,
}

/// Token → identity lookup, rebuilt incrementally from store mutations.
#[derive(Debug, Default)]
pub struct SearchIndex {
  /// prefix → (identity → position of the first token carrying the prefix)
  postings:  HashMap<String, HashMap<ChronicleId, usize>>,
  documents: HashMap<ChronicleId, IndexedDocument>,
  next_seq:  u64,
}

impl SearchIndex {
  pub fn new() -> Self { Self::default() }

  /// Index (or re-index) a record, replacing any previous postings for its
  /// identity. Records without an identity are ignored.
  pub fn index(&mut self, record: &Chronicle) {
    let Some(id) = record.id else {
      return;
    };
    self.remove(id);

    let mut tokens: HashMap<String, usize> = HashMap::new();
    for (position, token) in tokenize(&search_document(record)).into_iter().enumerate()
    {
      tokens.entry(token).or_insert(position);
    }

    for (token, &position) in &tokens {
      for prefix in prefixes(token) {
        let first = self
          .postings
          .entry(prefix.to_owned())
          .or_default()
          .entry(id)
          .or_insert(position);
        *first = (*first).min(position);
      }
    }

    self.next_seq += 1;
    self
      .documents
      .insert(id, IndexedDocument { tokens, seq: self.next_seq });
  }

  /// Drop every posting for `id`. Returns whether anything was indexed; an
  /// unknown identity is not an error.
  pub fn remove(&mut self, id: ChronicleId) -> bool {
    let Some(doc) = self.documents.remove(&id) else {
      return false;
    };
    for token in doc.tokens.keys() {
      for prefix in prefixes(token) {
        if let Some(ids) = self.postings.get_mut(prefix) {
          ids.remove(&id);
          if ids.is_empty() {
            self.postings.remove(prefix);
          }
        }
      }
    }
    true
  }

  /// Every identity whose document matches all tokens of `query`, unranked.
  /// An empty query matches nothing.
  pub fn matches(&self, query: &str) -> HashSet<ChronicleId> {
    self.scored(query).into_keys().collect()
  }

  /// Up to `limit` matching identities, best first.
  ///
  /// Documents whose matches sit earlier in the text rank higher; ties go to
  /// the most recently indexed.
  pub fn search(&self, query: &str, limit: usize) -> Vec<ChronicleId> {
    let mut hits: Vec<(ChronicleId, usize, u64)> = self
      .scored(query)
      .into_iter()
      .map(|(id, score)| {
        let seq = self.documents.get(&id).map_or(0, |d| d.seq);
        (id, score, seq)
      })
      .collect();
    hits.sort_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)));
    hits.into_iter().take(limit).map(|(id, ..)| id).collect()
  }

  fn scored(&self, query: &str) -> HashMap<ChronicleId, usize> {
    let tokens = tokenize(query);
    let Some((first, rest)) = tokens.split_first() else {
      return HashMap::new();
    };

    let mut scores = self.lookup(first);

    for token in rest {
      if scores.is_empty() {
        break;
      }
      let ids = self.lookup(token);
      scores.retain(|id, score| match ids.get(id) {
        Some(position) => {
          *score += position;
          true
        }
        None => false,
      });
    }
    scores
  }

  /// Identities with a token starting with `token`, each with the position of
  /// the first such token.
  fn lookup(&self, token: &str) -> HashMap<ChronicleId, usize> {
    let Some((cut, _)) = token.char_indices().nth(MAX_POSTED_PREFIX) else {
      return self.postings.get(token).cloned().unwrap_or_default();
    };
    let Some(candidates) = self.postings.get(&token[..cut]) else {
      return HashMap::new();
    };

    candidates
      .keys()
      .filter_map(|&id| {
        let doc = self.documents.get(&id)?;
        doc
          .tokens
          .iter()
          .filter(|(t, _)| t.starts_with(token))
          .map(|(_, &position)| position)
          .min()
          .map(|position| (id, position))
      })
      .collect()
  }

  pub fn contains(&self, id: ChronicleId) -> bool {
    self.documents.contains_key(&id)
  }

  /// Every indexed identity, in no particular order.
  pub fn ids(&self) -> impl Iterator<Item = ChronicleId> + '_ {
    self.documents.keys().copied()
  }

  pub fn len(&self) -> usize { self.documents.len() }

  pub fn is_empty(&self) -> bool { self.documents.is_empty() }

  pub fn clear(&mut self) { *self = Self::default(); }
}
