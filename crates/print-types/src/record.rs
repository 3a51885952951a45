//! Input rows.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Column holding the display identifier of a layer.
pub const LAYER_NUMBER_COLUMN: &str = "Layer Number";
/// Column holding the optional image locator.
pub const IMAGE_URL_COLUMN: &str = "image url";
/// Column holding the optional inherent error.
pub const ERROR_COLUMN: &str = "Error";
/// Value of [`ERROR_COLUMN`] that means "no inherent error".
pub const SUCCESS_SENTINEL: &str = "SUCCESS";
/// Layer number used when the column is absent or empty.
pub const UNKNOWN_LAYER: &str = "unknown";

/// One row of input.
///
/// All columns are kept in header order so the persisted record carries the
/// pass-through columns as well; only three of them are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    index: usize,
    layer_number: String,
    image_locator: Option<String>,
    inherent_error: Option<String>,
    fields: Vec<(String, String)>,
}

impl WorkRecord {
    /// Build a record from its position and `(column, value)` pairs.
    pub fn from_fields(index: usize, fields: Vec<(String, String)>) -> Self {
        let lookup = |name: &str| {
            fields
                .iter()
                .find(|(column, _)| column == name)
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        };

        let layer_number = lookup(LAYER_NUMBER_COLUMN)
            .unwrap_or(UNKNOWN_LAYER)
            .to_string();
        let image_locator = lookup(IMAGE_URL_COLUMN).map(str::to_string);
        let inherent_error = lookup(ERROR_COLUMN)
            .filter(|value| *value != SUCCESS_SENTINEL)
            .map(str::to_string);

        Self {
            index,
            layer_number,
            image_locator,
            inherent_error,
            fields,
        }
    }

    /// Ordinal position in the input, 0-based.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn layer_number(&self) -> &str {
        &self.layer_number
    }

    pub fn image_locator(&self) -> Option<&str> {
        self.image_locator.as_deref()
    }

    /// The fault recorded in the row itself, if any.
    pub fn inherent_error(&self) -> Option<&str> {
        self.inherent_error.as_deref()
    }

    /// All `(column, value)` pairs in header order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Serialized form persisted as `layer_data.txt`.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for WorkRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
