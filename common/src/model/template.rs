use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A certificate template: a base image on disk plus the layout of the text
/// fields drawn onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    /// Unique, human readable name. Also used to derive the stored image filename.
    pub name: String,
    /// Location of the base image, relative to the working directory of the server.
    pub file_path: String,
    pub fields_config: FieldsConfig,
}

/// Horizontal alignment of a field relative to its configured `x`.
///
/// Only `"center"` changes the draw origin. Every other value, including values
/// this service does not know about, is treated as left alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Align {
    #[default]
    Left,
    Center,
}

impl From<String> for Align {
    fn from(value: String) -> Self {
        if value == "center" {
            Align::Center
        } else {
            Align::Left
        }
    }
}

impl From<Align> for String {
    fn from(value: Align) -> Self {
        match value {
            Align::Left => "left".to_string(),
            Align::Center => "center".to_string(),
        }
    }
}

/// Draw specification for one text field on a template.
///
/// Every key is optional in the submitted JSON: a field with no `x` or `y` is
/// skipped at render time instead of being rejected at upload time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Font size in pixels. The renderer applies its configured default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic color name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Path to a TrueType/OpenType font file on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl FieldSpec {
    pub fn align(&self) -> Align {
        self.align.unwrap_or_default()
    }
}

/// Mapping from field name to its draw specification, stored as a JSON object
/// in `templates.fields_config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldsConfig(BTreeMap<String, FieldSpec>);

impl FieldsConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, spec: FieldSpec) {
        self.0.insert(field.into(), spec);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates fields in name order, which is also the order they are drawn in.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FieldSpec)> for FieldsConfig {
    fn from_iter<T: IntoIterator<Item = (String, FieldSpec)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
