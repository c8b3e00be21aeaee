#![forbid(unsafe_code)]

use crate::ids::{FileId, TagId, ValueId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub name: String,
}

/// A tag, optionally qualified by a value. `value_id: None` is the tag on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagValuePair {
    pub tag_id: TagId,
    pub value_id: Option<ValueId>,
}

impl TagValuePair {
    pub fn new(tag_id: TagId, value_id: Option<ValueId>) -> Self {
        Self { tag_id, value_id }
    }

    pub fn tag(tag_id: TagId) -> Self {
        Self {
            tag_id,
            value_id: None,
        }
    }
}

impl std::fmt::Display for TagValuePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value_id {
            Some(value_id) => write!(f, "tag#{}=value#{}", self.tag_id, value_id),
            None => write!(f, "tag#{}", self.tag_id),
        }
    }
}

/// "Files carrying the implying pair are treated as also carrying the implied pair."
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Implication {
    pub implying_tag: Tag,
    pub implying_value: Option<Value>,
    pub implied_tag: Tag,
    pub implied_value: Option<Value>,
}

impl Implication {
    pub fn implying_pair(&self) -> TagValuePair {
        TagValuePair::new(
            self.implying_tag.id,
            self.implying_value.as_ref().map(|value| value.id),
        )
    }

    pub fn implied_pair(&self) -> TagValuePair {
        TagValuePair::new(
            self.implied_tag.id,
            self.implied_value.as_ref().map(|value| value.id),
        )
    }

    pub fn implying_value_name(&self) -> &str {
        self.implying_value
            .as_ref()
            .map_or("", |value| value.name.as_str())
    }

    pub fn implied_value_name(&self) -> &str {
        self.implied_value
            .as_ref()
            .map_or("", |value| value.name.as_str())
    }

    /// True when the implied side is `tag_name[=value_name]`; an empty value name means no value.
    pub fn implies(&self, tag_name: &str, value_name: &str) -> bool {
        self.implied_tag.name == tag_name && self.implied_value_name() == value_name
    }
}

/// Content-derived identifier; empty when the file was never fingerprinted (e.g. directories).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub directory: String,
    pub name: String,
    pub fingerprint: Fingerprint,
    pub mod_time_ms: i64,
    pub size: i64,
    pub is_dir: bool,
}

impl File {
    pub fn path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.name)
    }
}

/// Properties of a file observed on disk, used to add or update a tracked file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub fingerprint: Fingerprint,
    pub mod_time_ms: i64,
    pub size: i64,
    pub is_dir: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTag {
    pub file_id: FileId,
    pub tag_id: TagId,
    pub value_id: Option<ValueId>,
    /// Applied directly to the file.
    pub explicit: bool,
    /// Reached through one or more implications.
    pub implicit: bool,
}

impl FileTag {
    pub fn pair(&self) -> TagValuePair {
        TagValuePair::new(self.tag_id, self.value_id)
    }
}
