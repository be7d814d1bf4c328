use serde::{Deserialize, Serialize};

use super::modifier::ModifierSource;
use super::stat::Stat;

/// The stats carried by one item, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    stats: Vec<Stat>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stat, replacing any existing stat with the same key
    pub fn insert(&mut self, stat: Stat) {
        match self.stats.iter_mut().find(|s| s.key() == stat.key()) {
            Some(existing) => *existing = stat,
            None => self.stats.push(stat),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Stat> {
        self.stats.iter().find(|s| s.key() == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Stat> {
        self.stats.iter_mut().find(|s| s.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Resolved value of a stat
    pub fn value(&self, key: &str) -> Option<f32> {
        self.get(key).map(Stat::value)
    }

    pub fn base_value(&self, key: &str) -> Option<f32> {
        self.get(key).map(Stat::base_value)
    }

    /// Remove every modifier owned by `source` from every stat.
    /// Returns the keys of the stats that lost at least one modifier.
    pub fn remove_all_from_source(&mut self, source: ModifierSource) -> Vec<String> {
        self.stats
            .iter_mut()
            .filter_map(|s| (s.remove_all_from_source(source) > 0).then(|| s.key().to_string()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stat> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
