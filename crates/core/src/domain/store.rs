use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A store display name returned by a proximity search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreCandidate(pub String);

impl StoreCandidate {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self(display_name.into())
    }

    pub fn display_name(&self) -> &str {
        &self.0
    }
}

/// Outcome of a single per-store stock lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StoreStock {
    Listed { store: String, level: i64 },
    /// The stock response did not contain a store with this display name.
    NotListed { store: String },
    /// Only produced when the fan-out tolerates per-store failures.
    Failed { store: String, reason: String },
}

impl StoreStock {
    pub fn store(&self) -> &str {
        match self {
            Self::Listed { store, .. } | Self::NotListed { store } | Self::Failed { store, .. } => {
                store
            }
        }
    }
}

/// Merged result of a stock fan-out. Only nonzero levels are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StockAggregate {
    levels: BTreeMap<String, i64>,
    not_listed: Vec<String>,
    failed: Vec<(String, String)>,
}

impl StockAggregate {
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = StoreStock>,
    {
        let mut aggregate = Self::default();
        for result in results {
            match result {
                StoreStock::Listed { level: 0, .. } => {}
                StoreStock::Listed { store, level } => {
                    aggregate.levels.insert(store, level);
                }
                StoreStock::NotListed { store } => aggregate.not_listed.push(store),
                StoreStock::Failed { store, reason } => aggregate.failed.push((store, reason)),
            }
        }
        aggregate.not_listed.sort();
        aggregate.failed.sort();
        aggregate
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn total(&self) -> i64 {
        self.levels.values().sum()
    }

    pub fn level(&self, store: &str) -> Option<i64> {
        self.levels.get(store).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.levels.iter().map(|(store, level)| (store.as_str(), *level))
    }

    pub fn not_listed(&self) -> &[String] {
        &self.not_listed
    }

    pub fn failed(&self) -> &[(String, String)] {
        &self.failed
    }
}
