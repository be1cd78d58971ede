use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open-ended participant attributes that are not part of the standard set
/// (`name`, `email`, `event`, `position`, `date`).
///
/// In memory this is a typed map; in the database it is stored as a JSON object
/// in a single text column. `to_json` and `from_json` are the only places where
/// that conversion happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(BTreeMap<String, String>);

impl CustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from parallel key/value inputs, as sent by the manual entry
    /// form. Both sides are trimmed and a pair is kept only when neither is empty.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map = pairs
            .into_iter()
            .filter_map(|(k, v)| {
                let key = k.as_ref().trim();
                let value = v.as_ref().trim();
                (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes to the JSON text stored in `participants.custom_fields`.
    pub fn to_json(&self) -> String {
        // A string map always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parses the stored JSON text. Null values in the stored object are dropped;
    /// non-string scalars are kept in their JSON text form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let map = value
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((k, s)),
                other => Some((k, other.to_string())),
            })
            .collect();
        Ok(Self(map))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_drops_blank_entries() {
        let fields = CustomFields::from_pairs([
            (" track ", " Systems "),
            ("", "orphan value"),
            ("empty", "   "),
        ]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("track"), Some("Systems"));
    }

    #[test]
    fn json_round_trip() {
        let fields: CustomFields = [("award", "Best Paper"), ("room", "B12")].into_iter().collect();
        let parsed = CustomFields::from_json(&fields.to_json()).unwrap();
        assert_eq!(parsed, fields);
    }

    #[test]
    fn from_json_handles_nulls_and_numbers() {
        let parsed = CustomFields::from_json(r#"{"score": 97, "note": null, "team": "red"}"#).unwrap();
        assert_eq!(parsed.get("score"), Some("97"));
        assert_eq!(parsed.get("note"), None);
        assert_eq!(parsed.get("team"), Some("red"));
    }

    #[test]
    fn from_json_empty_text_is_empty_map() {
        assert!(CustomFields::from_json("").unwrap().is_empty());
    }

    #[test]
    fn from_json_rejects_malformed_text() {
        assert!(CustomFields::from_json("{not json").is_err());
        assert!(CustomFields::from_json("[1, 2]").is_err());
    }
}
