//! JSON rendering of the catalog.

use crate::errors::ForgeError;
use crate::model::Catalog;

/// Pretty-printed archive with top-level `enums` and `classes` maps keyed
/// by fully qualified name.
pub fn render_json(catalog: &Catalog) -> Result<String, ForgeError> {
    serde_json::to_string_pretty(catalog).map_err(|source| ForgeError::CatalogJson { source })
}

/// Rebuild a catalog from its archive form.
pub fn parse_json(text: &str) -> Result<Catalog, ForgeError> {
    serde_json::from_str(text).map_err(|source| ForgeError::CatalogJson { source })
}
