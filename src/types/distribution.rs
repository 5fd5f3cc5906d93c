//! Score distributions over candidate categories.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Probability per category, kept in the order the caller supplied the categories.
///
/// Serializes as a JSON object whose keys appear in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDistribution {
    entries: Vec<(String, f32)>,
}

impl ScoreDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a category score. Order of insertion is the output order.
    pub fn push(&mut self, category: impl Into<String>, score: f32) {
        self.entries.push((category.into(), score));
    }

    /// Score for a category, if present.
    pub fn get(&self, category: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries
            .iter()
            .map(|(label, score)| (label.as_str(), *score))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all scores.
    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, score)| score).sum()
    }

    /// Highest-scoring category.
    ///
    /// On exact ties the category that appears first wins.
    pub fn best(&self) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (label, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best
    }

    /// Divide every score by the total so the distribution sums to 1.
    ///
    /// A zero total leaves the scores untouched.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            for (_, score) in &mut self.entries {
                *score /= total;
            }
        }
    }
}

impl FromIterator<(String, f32)> for ScoreDistribution {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ScoreDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, score) in &self.entries {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = ScoreDistribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut distribution =
                    ScoreDistribution::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, score)) = access.next_entry::<String, f32>()? {
                    distribution.push(label, score);
                }
                Ok(distribution)
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}
