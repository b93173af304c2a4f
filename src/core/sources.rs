//! Round-trip editing of recipe source metadata
//!
//! Two documents live next to a recipe:
//!
//! - `sources.toml`: `[sources]` maps quoted version keys to
//!   `{ url, sha256 }` records, newest first. Downstream tooling reads
//!   "the current version" as the first key, so insertion position is
//!   part of the contract.
//! - `versions.toml`: the optional companion index; `[versions]` maps
//!   version keys to build metadata (at least `folder`).
//!
//! Both are edited in a single load-mutate-save round trip. Comments,
//! blank lines and quoting on untouched entries survive byte-for-byte;
//! a version that is already recorded is a no-op and the file must not
//! be rewritten.

use crate::core::error::{BumpError, BumpResult, MetadataError};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

const SOURCES_TABLE: &str = "sources";
const VERSIONS_TABLE: &str = "versions";

/// Result of an upsert against an ordered version mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  /// The entry was inserted at the front
  Added,
  /// The exact version key already exists; nothing was modified
  AlreadyPresent,
}

/// Result of updating the companion version index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
  /// Inserted at the front, metadata copied from the named version
  Added { inherited_from: String },
  /// The version is already indexed; nothing was modified
  AlreadyPresent,
  /// The index has no entries to inherit from; nothing was modified
  Empty,
}

/// Insert `item` under `version` as the first entry of `table`
///
/// toml_edit tables iterate in insertion order but have no positional
/// insert, so the existing entries are drained and re-attached behind the
/// new one. `remove_entry` + `insert_formatted` keep each retained pair's
/// key repr and decor, which is what makes the round trip byte-preserving.
fn insert_at_front(table: &mut Table, version: &str, item: Item) {
  let existing: Vec<String> = table.iter().map(|(key, _)| key.to_string()).collect();
  let mut tail = Vec::with_capacity(existing.len());
  for key in &existing {
    if let Some(pair) = table.remove_entry(key) {
      tail.push(pair);
    }
  }

  table.insert(version, item);
  for (key, item) in tail {
    table.insert_formatted(&key, item);
  }
}

/// Read the `url` field out of a version entry, whichever layout it uses
fn entry_url(item: &Item) -> Option<&str> {
  match item {
    Item::Value(Value::InlineTable(entry)) => entry.get("url").and_then(Value::as_str),
    Item::Table(entry) => entry.get("url").and_then(Item::as_str),
    _ => None,
  }
}

/// The per-recipe `sources.toml` document
pub struct SourcesDoc {
  path: PathBuf,
  doc: DocumentMut,
}

impl SourcesDoc {
  /// Load and parse the document
  pub fn load(path: &Path) -> BumpResult<Self> {
    if !path.exists() {
      return Err(BumpError::Metadata(MetadataError::NotFound {
        path: path.to_path_buf(),
      }));
    }
    let content = fs::read_to_string(path)?;
    let doc = content.parse::<DocumentMut>().map_err(|e| {
      BumpError::Metadata(MetadataError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
      })
    })?;
    Ok(Self {
      path: path.to_path_buf(),
      doc,
    })
  }

  fn sources(&self) -> Option<&Table> {
    self.doc.get(SOURCES_TABLE).and_then(Item::as_table)
  }

  /// URL of the most recent entry, the sample the deriver clones
  pub fn first_url(&self) -> BumpResult<String> {
    self
      .sources()
      .and_then(|table| table.iter().next())
      .and_then(|(_, item)| entry_url(item))
      .map(str::to_string)
      .ok_or_else(|| {
        BumpError::Metadata(MetadataError::NoSources {
          path: self.path.clone(),
        })
      })
  }

  /// Whether `version` is already recorded (exact key comparison)
  pub fn contains(&self, version: &str) -> bool {
    self.sources().is_some_and(|table| table.contains_key(version))
  }

  /// Insert `version -> { url, <digest field> }` at the front
  ///
  /// Reports `AlreadyPresent` without touching the document when the key
  /// exists; the caller must skip `save` in that case to avoid a
  /// spurious diff.
  pub fn upsert_version(
    &mut self,
    version: &str,
    url: &str,
    digest_field: &str,
    digest: &str,
  ) -> BumpResult<UpsertOutcome> {
    let path = self.path.clone();
    let sources = self.doc[SOURCES_TABLE]
      .or_insert(Item::Table(Table::new()))
      .as_table_mut()
      .ok_or_else(|| {
        BumpError::Metadata(MetadataError::Malformed {
          path,
          message: "`sources` is not a table".to_string(),
        })
      })?;

    if sources.contains_key(version) {
      return Ok(UpsertOutcome::AlreadyPresent);
    }

    let mut entry = InlineTable::new();
    entry.insert("url", Value::from(url));
    entry.insert(digest_field, Value::from(digest));

    insert_at_front(sources, version, Item::Value(Value::InlineTable(entry)));
    Ok(UpsertOutcome::Added)
  }

  /// Write the document back to disk
  pub fn save(&self) -> BumpResult<()> {
    fs::write(&self.path, self.doc.to_string())?;
    Ok(())
  }

  #[cfg(test)]
  fn to_doc_string(&self) -> String {
    self.doc.to_string()
  }
}

/// The optional companion `versions.toml` index
pub struct VersionIndex {
  path: PathBuf,
  doc: DocumentMut,
}

impl VersionIndex {
  /// Load the index if the file exists; `None` means "this recipe does
  /// not carry one", which is not an error
  pub fn load_if_exists(path: &Path) -> BumpResult<Option<Self>> {
    if !path.exists() {
      return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let doc = content.parse::<DocumentMut>().map_err(|e| {
      BumpError::Metadata(MetadataError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
      })
    })?;
    Ok(Some(Self {
      path: path.to_path_buf(),
      doc,
    }))
  }

  fn versions(&self) -> Option<&Table> {
    self.doc.get(VERSIONS_TABLE).and_then(Item::as_table)
  }

  /// Version key of the most recent entry
  pub fn latest_version(&self) -> Option<String> {
    self
      .versions()
      .and_then(|table| table.iter().next())
      .map(|(key, _)| key.to_string())
  }

  /// `folder` field of the most recent entry, if it carries one
  pub fn latest_folder(&self) -> Option<String> {
    let (_, item) = self.versions()?.iter().next()?;
    let folder = match item {
      Item::Value(Value::InlineTable(entry)) => entry.get("folder").and_then(Value::as_str),
      Item::Table(entry) => entry.get("folder").and_then(Item::as_str),
      _ => None,
    };
    folder.map(str::to_string)
  }

  /// Whether the index has no entries at all
  pub fn is_empty(&self) -> bool {
    self.versions().is_none_or(Table::is_empty)
  }

  /// Index `version` at the front, inheriting the most recent entry's
  /// metadata (deep copy, never a blank record)
  pub fn upsert_version(&mut self, version: &str) -> IndexOutcome {
    let Some(versions) = self.doc.get_mut(VERSIONS_TABLE).and_then(Item::as_table_mut) else {
      return IndexOutcome::Empty;
    };

    if versions.contains_key(version) {
      return IndexOutcome::AlreadyPresent;
    }

    let Some((template_key, template_item)) = versions.iter().next().map(|(key, item)| (key.to_string(), item.clone()))
    else {
      return IndexOutcome::Empty;
    };

    // Normalize the copy to the inline layout and drop the template's
    // decor so its comments are not duplicated onto the new entry.
    let copied = match template_item {
      Item::Value(mut value) => {
        value.decor_mut().clear();
        Item::Value(value)
      }
      Item::Table(table) => Item::Value(Value::InlineTable(table.into_inline_table())),
      other => other,
    };

    insert_at_front(versions, version, copied);
    IndexOutcome::Added {
      inherited_from: template_key,
    }
  }

  /// Write the index back to disk
  pub fn save(&self) -> BumpResult<()> {
    fs::write(&self.path, self.doc.to_string())?;
    Ok(())
  }
}
