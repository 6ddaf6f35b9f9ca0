use serde_json::{Map, Value};
use std::fmt;

/// A dotted attribute path (`"address.city"`), parsed once into an ordered,
/// non-empty sequence of segments.
///
/// All nested-attribute handling goes through this type instead of ad-hoc
/// string splitting: reading walks nested maps, writing creates intermediate
/// maps and merges with existing siblings.
///
/// # Example
///
/// ```
/// use strata_core::AttrPath;
/// use serde_json::{json, Map};
///
/// let path = AttrPath::parse("address.city").unwrap();
/// let entity = json!({ "address": { "city": "Lyon", "zip": "69001" } });
/// assert_eq!(path.read(&entity), Some(&json!("Lyon")));
///
/// let mut record = Map::new();
/// path.write(&mut record, json!("Paris"));
/// assert_eq!(record["address"]["city"], json!("Paris"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrPath {
    segments: Vec<String>,
}

impl AttrPath {
    /// Parse a dotted path. Rejects empty input and empty segments
    /// (leading/trailing/consecutive dots).
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::new(raw));
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::new(raw));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path has more than one segment.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Walk nested maps and return the value at this path, if present.
    pub fn read<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let mut current = value;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// [`read`](Self::read) starting from a bare record.
    pub fn read_map<'v>(&self, record: &'v Map<String, Value>) -> Option<&'v Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = record.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate maps as needed.
    ///
    /// Merge semantics: existing sibling keys are preserved; the leaf is
    /// overwritten; a non-map intermediate is replaced by a map.
    pub fn write(&self, record: &mut Map<String, Value>, value: Value) {
        let mut current = record;
        let (leaf, intermediate) = self
            .segments
            .split_last()
            .expect("AttrPath segments are non-empty");
        for segment in intermediate {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = slot
                .as_object_mut()
                .expect("slot was just ensured to be an object");
        }
        current.insert(leaf.clone(), value);
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl std::str::FromStr for AttrPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error parsing a dotted attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    raw: String,
}

impl PathError {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid attribute path: '{}'", self.raw)
    }
}

impl std::error::Error for PathError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_single_segment() {
        let path = AttrPath::parse("id").unwrap();
        assert_eq!(path.segments(), ["id"]);
        assert!(!path.is_nested());
    }

    #[test]
    fn parse_nested() {
        let path = AttrPath::parse("address.city").unwrap();
        assert_eq!(path.segments(), ["address", "city"]);
        assert!(path.is_nested());
        assert_eq!(path.to_string(), "address.city");
    }

    #[test]
    fn parse_rejects_empty_and_dangling_dots() {
        assert!(AttrPath::parse("").is_err());
        assert!(AttrPath::parse(".city").is_err());
        assert!(AttrPath::parse("address.").is_err());
        assert!(AttrPath::parse("address..city").is_err());
    }

    #[test]
    fn read_missing_returns_none() {
        let path = AttrPath::parse("address.city").unwrap();
        assert_eq!(path.read(&json!({ "address": {} })), None);
        assert_eq!(path.read(&json!({ "name": "x" })), None);
        assert_eq!(path.read(&json!("not a map")), None);
    }

    #[test]
    fn write_merges_with_existing_siblings() {
        let mut record = serde_json::Map::new();
        AttrPath::parse("address.city")
            .unwrap()
            .write(&mut record, json!("Lyon"));
        AttrPath::parse("address.zip")
            .unwrap()
            .write(&mut record, json!("69001"));
        assert_eq!(
            serde_json::Value::Object(record),
            json!({ "address": { "city": "Lyon", "zip": "69001" } })
        );
    }

    #[test]
    fn write_overwrites_leaf_and_non_map_intermediates() {
        let mut record = serde_json::Map::new();
        record.insert("address".into(), json!("flat string"));
        let path = AttrPath::parse("address.city").unwrap();
        path.write(&mut record, json!("Lyon"));
        path.write(&mut record, json!("Paris"));
        assert_eq!(record["address"]["city"], json!("Paris"));
    }
}
