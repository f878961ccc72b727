//! Read-only snapshots of the configuration store.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::Serialize;

use crate::models::Value;

/// Set of configuration categories selected for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category(u8);

impl Category {
    pub const DEFINITIONS: Category = Category(1);
    pub const DELEGATES: Category = Category(2);
    pub const PREPARES: Category = Category(4);
    pub const ALIASES: Category = Category(8);
    pub const SHARES: Category = Category(16);
    pub const ALL: Category = Category(31);

    pub fn contains(self, other: Category) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::ALL
    }
}

impl BitOr for Category {
    type Output = Category;

    fn bitor(self, rhs: Category) -> Category {
        Category(self.0 | rhs.0)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "definitions" => Ok(Category::DEFINITIONS),
            "delegates" => Ok(Category::DELEGATES),
            "prepares" => Ok(Category::PREPARES),
            "aliases" => Ok(Category::ALIASES),
            "shares" => Ok(Category::SHARES),
            "all" => Ok(Category::ALL),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Category::DEFINITIONS, "definitions"),
            (Category::DELEGATES, "delegates"),
            (Category::PREPARES, "prepares"),
            (Category::ALIASES, "aliases"),
            (Category::SHARES, "shares"),
        ];
        let selected: Vec<_> = names
            .iter()
            .filter(|(category, _)| self.contains(*category))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&selected.join("|"))
    }
}

/// Snapshot returned by [`Injector::inspect`](crate::injector::Injector::inspect).
///
/// A field is `None` when its category was not requested. Keys are
/// normalized type names; injections and callables are rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inspection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, BTreeMap<String, String>>>,
    /// Global parameter defaults; reported with definitions when no type
    /// filter is applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegates: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepares: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<BTreeMap<String, String>>,
    /// Shared types and the class of their instance; `None` while pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<BTreeMap<String, Option<String>>>,
}

fn non_empty<K, V>(map: &Option<BTreeMap<K, V>>) -> bool {
    map.as_ref().is_some_and(|map| !map.is_empty())
}

impl Inspection {
    /// Number of categories holding at least one entry.
    pub fn non_empty_count(&self) -> usize {
        [
            non_empty(&self.definitions) || non_empty(&self.params),
            non_empty(&self.delegates),
            non_empty(&self.prepares),
            non_empty(&self.aliases),
            non_empty(&self.shares),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}
