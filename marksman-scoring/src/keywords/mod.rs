// marksman-scoring/src/keywords/mod.rs
//! Keyword entries, the reference keyword index and keyword score maps.
//!
//! A [`KeywordIndex`] is built once per reference text and is read-only
//! afterwards. It fixes the iteration order of reference keywords (the order
//! in which the analyzer reported them), which in turn makes fuzzy-match
//! tie-breaking reproducible.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Categorical entity tag reported by the language-analysis service.
///
/// Only used for match bonuses and fuzzy-candidate filtering, never to
/// exclude a keyword from scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Location,
    Organization,
    Event,
    WorkOfArt,
    ConsumerGood,
    PhoneNumber,
    Address,
    Date,
    Number,
    Price,
    Other,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::ConsumerGood => "CONSUMER_GOOD",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Address => "ADDRESS",
            EntityType::Date => "DATE",
            EntityType::Number => "NUMBER",
            EntityType::Price => "PRICE",
            EntityType::Other => "OTHER",
            EntityType::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// One term extracted from a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Normalized (lower-cased, whitespace-collapsed) keyword.
    pub name: String,
    /// Relative importance in [0, 1].
    pub salience: f64,
    #[serde(rename = "type", default)]
    pub entity_type: EntityType,
    /// Number of times the term appears in its text.
    #[serde(default = "default_mentions")]
    pub mention_count: u32,
}

fn default_mentions() -> u32 {
    1
}

impl KeywordEntry {
    /// Creates an entry, normalizing the name and clamping salience into [0, 1].
    pub fn new(name: &str, salience: f64, entity_type: EntityType, mention_count: u32) -> Self {
        let salience = if salience.is_finite() { salience.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            name: normalize_keyword(name),
            salience,
            entity_type,
            mention_count,
        }
    }

    /// Returns a copy whose name is normalized. Used on entries that were
    /// deserialized as-is from a fixture or a remote response.
    pub fn normalized(mut self) -> Self {
        self.name = normalize_keyword(&self.name);
        if !self.salience.is_finite() {
            self.salience = 0.0;
        }
        self.salience = self.salience.clamp(0.0, 1.0);
        self
    }

    /// Mention count with zero treated as one, so it is always a safe divisor.
    pub fn effective_mentions(&self) -> f64 {
        f64::from(self.mention_count.max(1))
    }
}

/// Lower-cases a keyword and collapses internal whitespace runs.
pub fn normalize_keyword(raw: &str) -> String {
    WHITESPACE_RUN
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

/// Read-only lookup of reference keywords, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: Vec<KeywordEntry>,
    positions: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl KeywordIndex {
    /// Builds the index from the reference text's entries.
    ///
    /// Duplicate names are not expected from the analyzer. If one occurs the
    /// keyword keeps its first position, the last-seen metadata wins, and the
    /// name is recorded in [`KeywordIndex::duplicates`].
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = KeywordEntry>,
    {
        let mut index = KeywordIndex::default();

        for entry in entries {
            let entry = entry.normalized();
            match index.positions.get(&entry.name) {
                Some(&pos) => {
                    warn!(
                        "Duplicate reference keyword '{}' reported by analyzer; keeping last-seen metadata.",
                        entry.name
                    );
                    if !index.duplicates.contains(&entry.name) {
                        index.duplicates.push(entry.name.clone());
                    }
                    index.entries[pos] = entry;
                }
                None => {
                    index.positions.insert(entry.name.clone(), index.entries.len());
                    index.entries.push(entry);
                }
            }
        }

        debug!("Built keyword index with {} reference keywords.", index.entries.len());
        index
    }

    pub fn get(&self, name: &str) -> Option<&KeywordEntry> {
        self.positions.get(name).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_salience(&self) -> f64 {
        self.entries.iter().map(|e| e.salience).sum()
    }

    /// Names that the analyzer reported more than once.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// A score map with every reference keyword present at 0.0.
    pub fn empty_score_map(&self) -> KeywordScoreMap {
        KeywordScoreMap::zeroed(self.names())
    }
}

/// Mapping from reference keyword name to accumulated score mass.
///
/// The key set is fixed at construction: every reference keyword is present,
/// a missing keyword is represented by a score of 0.0 rather than by absence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeywordScoreMap {
    names: Vec<String>,
    scores: Vec<f64>,
}

impl KeywordScoreMap {
    /// Creates a map with every name at 0.0. Repeated names are kept once.
    pub fn zeroed<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = KeywordScoreMap::default();
        for name in names {
            if !map.names.iter().any(|n| n == name) {
                map.names.push(name.to_string());
                map.scores.push(0.0);
            }
        }
        map
    }

    /// Builds a map from `(name, score)` pairs, preserving their order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = KeywordScoreMap::default();
        for (name, score) in pairs {
            let name = name.into();
            match map.names.iter().position(|n| *n == name) {
                Some(pos) => map.scores[pos] = score,
                None => {
                    map.names.push(name);
                    map.scores.push(score);
                }
            }
        }
        map
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|pos| self.scores[pos])
    }

    /// Updates the score of an existing key. Unknown keys are ignored, which
    /// keeps the key set identical to the reference keyword set.
    pub(crate) fn set(&mut self, name: &str, score: f64) {
        if let Some(pos) = self.position(name) {
            self.scores[pos] = score;
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.scores.iter().copied())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns a new map with the same keys and transformed values.
    pub fn map_values<F>(&self, mut f: F) -> KeywordScoreMap
    where
        F: FnMut(&str, f64) -> f64,
    {
        KeywordScoreMap {
            names: self.names.clone(),
            scores: self.iter().map(|(name, score)| f(name, score)).collect(),
        }
    }
}

impl Serialize for KeywordScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, score) in self.iter() {
            map.serialize_entry(name, &score)?;
        }
        map.end()
    }
}
