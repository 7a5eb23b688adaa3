//! Aggregation request fragments
//!
//! An `AggMap` is an ordered mapping from aggregation name to `Aggregation`.
//! An `Aggregation` is its definition (aggregation type key to body, e.g.
//! `{"terms": {"field": "ipo_year"}}`) plus the sub-aggregations nested
//! under it, serialized as `aggs`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Ordered name → aggregation mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggMap {
    entries: Vec<(String, Aggregation)>,
}

impl AggMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an aggregation, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, aggregation: Aggregation) -> Option<Aggregation> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, aggregation)),
            None => {
                self.entries.push((name, aggregation));
                None
            }
        }
    }

    /// Moves every entry of `other` into this map, replacing on name clash
    pub fn merge(&mut self, other: AggMap) {
        for (name, aggregation) in other.entries {
            self.insert(name, aggregation);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Aggregation> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Aggregation)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// Walks down `path`, one named aggregation per level, and returns the
    /// `aggs` mapping of the last one. An empty path returns `self`.
    pub fn descend_mut(&mut self, path: &[String]) -> Option<&mut AggMap> {
        let mut current = self;
        for name in path {
            current = current.get_mut(name)?.aggs_mut();
        }
        Some(current)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for AggMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, aggregation) in &self.entries {
            map.serialize_entry(name, aggregation)?;
        }
        map.end()
    }
}

/// A single aggregation definition with its nested sub-aggregations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    definition: Map<String, Value>,
    aggs: AggMap,
}

impl Aggregation {
    /// Creates `{agg_type: body}`
    pub fn new(agg_type: impl Into<String>, body: Value) -> Self {
        let mut definition = Map::new();
        definition.insert(agg_type.into(), body);
        Self {
            definition,
            aggs: AggMap::new(),
        }
    }

    /// Creates an aggregation from a raw definition mapping
    pub fn from_definition(definition: Map<String, Value>) -> Self {
        Self {
            definition,
            aggs: AggMap::new(),
        }
    }

    /// Nests `aggregation` under this one as `name`
    pub fn with_child(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.aggs.insert(name, aggregation);
        self
    }

    /// The aggregation type, if the definition holds exactly one key
    pub fn agg_type(&self) -> Option<&str> {
        let mut keys = self.definition.keys();
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn definition(&self) -> &Map<String, Value> {
        &self.definition
    }

    /// Body object for `agg_type`, if it exists and is an object
    pub fn body_mut(&mut self, agg_type: &str) -> Option<&mut Map<String, Value>> {
        self.definition.get_mut(agg_type)?.as_object_mut()
    }

    pub fn aggs(&self) -> &AggMap {
        &self.aggs
    }

    pub fn aggs_mut(&mut self) -> &mut AggMap {
        &mut self.aggs
    }
}

impl Serialize for Aggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.definition.len() + usize::from(!self.aggs.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.definition {
            map.serialize_entry(key, value)?;
        }
        if !self.aggs.is_empty() {
            map.serialize_entry("aggs", &self.aggs)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_nested() {
        let year = Aggregation::new("terms", json!({"field": "ipo_year"}))
            .with_child("sum_this_year", Aggregation::new("sum", json!({"field": "market_cap"})));
        let mut aggs = AggMap::new();
        aggs.insert("ipo_year", year);

        assert_eq!(
            aggs.to_value(),
            json!({
                "ipo_year": {
                    "terms": {"field": "ipo_year"},
                    "aggs": {"sum_this_year": {"sum": {"field": "market_cap"}}}
                }
            })
        );
    }

    #[test]
    fn test_agg_type_requires_single_key() {
        let agg = Aggregation::new("terms", json!({}));
        assert_eq!(agg.agg_type(), Some("terms"));

        let mut definition = Map::new();
        definition.insert("terms".into(), json!({}));
        definition.insert("meta".into(), json!({}));
        assert_eq!(Aggregation::from_definition(definition).agg_type(), None);

        assert_eq!(Aggregation::default().agg_type(), None);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut aggs = AggMap::new();
        aggs.insert("a", Aggregation::new("sum", json!({"field": "x"})));
        aggs.insert("b", Aggregation::new("max", json!({"field": "y"})));
        let previous = aggs.insert("a", Aggregation::new("min", json!({"field": "z"})));

        assert!(previous.is_some());
        assert_eq!(aggs.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(aggs.get("a").and_then(|a| a.agg_type()), Some("min"));
    }

    #[test]
    fn test_descend_mut() {
        let mut aggs = AggMap::new();
        aggs.insert(
            "outer",
            Aggregation::new("filter", json!({"term": {"a": 1}}))
                .with_child("inner", Aggregation::new("terms", json!({"field": "b"}))),
        );

        let path = vec!["outer".to_string(), "inner".to_string()];
        let tail = aggs.descend_mut(&path).unwrap();
        tail.insert("total", Aggregation::new("sum", json!({"field": "c"})));

        assert_eq!(
            aggs.to_value()["outer"]["aggs"]["inner"]["aggs"]["total"],
            json!({"sum": {"field": "c"}})
        );
        assert!(aggs.descend_mut(&["missing".to_string()]).is_none());
    }
}
