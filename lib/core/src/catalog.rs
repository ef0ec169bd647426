use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical form used for name matching: trimmed and lowercased
#[inline]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A catalog entry. `id` is its position in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: usize,
    pub normalized_name: String,
    pub display_name: String,
    /// Auxiliary display fields such as rating or cuisines
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A raw record handed over by the dataset loader
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityRecord {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Ordered, immutable list of entities
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
}

impl EntityCatalog {
    /// Build a catalog, assigning ids in record order
    pub fn from_records(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        let entities = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| Entity {
                id,
                normalized_name: normalize_name(&record.name),
                display_name: record.name.trim().to_string(),
                attributes: record.attributes,
            })
            .collect();
        Self { entities }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_records(names.into_iter().map(EntityRecord::new))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Display names sorted and deduplicated, for selection lists
    pub fn sorted_unique_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.iter().map(|e| e.display_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
