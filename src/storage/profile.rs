//! External profile document (`profile.json`)
//!
//! A hand-edited, richer profile kept apart from the profile embedded in the
//! history document. Any leaf may still hold its template wording, which the
//! context builder treats as unset. `save` always overwrites the whole file.

use crate::context::profile::profile_summary;
use crate::storage::document::JsonDocument;
use crate::storage::error::StorageResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name used inside a data directory
pub const PROFILE_FILE: &str = "profile.json";

/// The external profile document
///
/// Every leaf is read leniently: `null` or a mistyped value becomes empty
/// instead of failing the whole document (see [`lenient`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// Free-form key/value basics (name, age, occupation, ...)
    #[serde(
        default,
        deserialize_with = "lenient::map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub basic_info: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "lenient::section",
        skip_serializing_if = "Personality::is_empty"
    )]
    pub personality: Personality,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub interests_and_hobbies: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::section",
        skip_serializing_if = "Goals::is_empty"
    )]
    pub goals: Goals,
    /// Free-form; `challenges` is expected to be a list
    #[serde(
        default,
        deserialize_with = "lenient::map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub life_situation: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "lenient::section",
        skip_serializing_if = "Preferences::is_empty"
    )]
    pub preferences: Preferences,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExternalProfile {
    pub fn is_empty(&self) -> bool {
        self.basic_info.is_empty()
            && self.personality.is_empty()
            && self.interests_and_hobbies.is_empty()
            && self.goals.is_empty()
            && self.life_situation.is_empty()
            && self.preferences.is_empty()
            && self.notes.is_empty()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    #[serde(default, deserialize_with = "lenient::list")]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub values: Vec<String>,
}

impl Personality {
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty() && self.values.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default, deserialize_with = "lenient::list")]
    pub short_term: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub long_term: Vec<String>,
}

impl Goals {
    pub fn is_empty(&self) -> bool {
        self.short_term.is_empty() && self.long_term.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, deserialize_with = "lenient::string")]
    pub advice_style: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub focus_areas: Vec<String>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.advice_style.is_empty() && self.focus_areas.is_empty()
    }
}

/// Tolerant leaf readers for the hand-edited profile
///
/// Numbers become their decimal text, a lone string where a list is
/// expected becomes a one-item list, anything else is dropped.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::{Map, Value};

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(text).collect(),
            other => text(other).into_iter().collect(),
        })
    }

    pub fn map<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    pub fn section<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }
}

/// Durable store for the external profile
#[derive(Debug)]
pub struct ProfileStore {
    document: JsonDocument<ExternalProfile>,
}

impl ProfileStore {
    /// Open (and create as `{}` if absent) the profile document at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let document = JsonDocument::new(path);
        if let Err(e) = document.initialize(ExternalProfile::default) {
            tracing::error!(
                "Failed to initialise profile document {:?}: {}",
                document.path(),
                e
            );
        }
        Self { document }
    }

    /// Open `profile.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::open(data_dir.join(PROFILE_FILE))
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Current profile; empty on any failure or if the file is missing
    pub fn load(&self) -> ExternalProfile {
        self.try_load().unwrap_or_else(|e| {
            tracing::error!("Failed to load profile from {:?}: {}", self.path(), e);
            ExternalProfile::default()
        })
    }

    pub fn try_load(&self) -> StorageResult<ExternalProfile> {
        Ok(self.document.read()?.unwrap_or_default())
    }

    /// Replace the stored profile
    pub fn save(&self, profile: &ExternalProfile) -> bool {
        match self.try_save(profile) {
            Ok(()) => {
                tracing::info!("Saved profile to {:?}", self.path());
                true
            }
            Err(e) => {
                tracing::error!("Failed to save profile to {:?}: {}", self.path(), e);
                false
            }
        }
    }

    pub fn try_save(&self, profile: &ExternalProfile) -> StorageResult<()> {
        self.document.replace(profile)
    }

    /// Write `profile` only if nothing has been stored yet.
    ///
    /// Returns `false` and leaves the file alone when it already has
    /// content; an unreadable file is an error, never overwritten.
    pub fn try_save_if_empty(&self, profile: &ExternalProfile) -> StorageResult<bool> {
        self.document
            .replace_if(|current| current.map_or(true, ExternalProfile::is_empty), profile)
    }

    /// Short human-readable summary of what has been filled in
    pub fn summary(&self) -> String {
        profile_summary(&self.load())
    }
}
