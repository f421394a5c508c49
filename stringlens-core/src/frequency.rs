// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Character frequency map
//!
//! Occurrence counts per Unicode code point. Entries keep the order in which
//! each code point first appears in the source string, and that order is
//! preserved when the map is serialized as a JSON object.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Ordered code point → occurrence count map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFrequencyMap {
    entries: Vec<(char, usize)>,
}

impl CharacterFrequencyMap {
    /// Count every code point of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut positions: HashMap<char, usize> = HashMap::new();
        let mut entries: Vec<(char, usize)> = Vec::new();

        for c in text.chars() {
            match positions.get(&c) {
                Some(&idx) => entries[idx].1 += 1,
                None => {
                    positions.insert(c, entries.len());
                    entries.push((c, 1));
                }
            }
        }

        Self { entries }
    }

    /// Occurrences of `c`, zero when absent.
    pub fn count(&self, c: char) -> usize {
        self.entries
            .iter()
            .find(|(key, _)| *key == c)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn contains(&self, c: char) -> bool {
        self.count(c) > 0
    }

    /// Number of distinct code points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Iterate in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.entries.iter().copied()
    }
}

impl Serialize for CharacterFrequencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        let mut buf = [0u8; 4];
        for (c, n) in &self.entries {
            map.serialize_entry(c.encode_utf8(&mut buf) as &str, n)?;
        }
        map.end()
    }
}

struct FrequencyMapVisitor;

impl<'de> Visitor<'de> for FrequencyMapVisitor {
    type Value = CharacterFrequencyMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of single characters to positive counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(char, usize)> = Vec::with_capacity(access.size_hint().unwrap_or(0));

        while let Some((key, count)) = access.next_entry::<String, usize>()? {
            let mut chars = key.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(de::Error::custom(format!(
                        "frequency key must be a single character, got {:?}",
                        key
                    )))
                }
            };
            if count == 0 {
                return Err(de::Error::custom(format!("zero count for {:?}", key)));
            }
            if entries.iter().any(|(existing, _)| *existing == c) {
                return Err(de::Error::custom(format!("duplicate key {:?}", key)));
            }
            entries.push((c, count));
        }

        Ok(CharacterFrequencyMap { entries })
    }
}

impl<'de> Deserialize<'de> for CharacterFrequencyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FrequencyMapVisitor)
    }
}
