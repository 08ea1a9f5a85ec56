//! In-memory category catalog served by the API
//!
//! The catalog is seeded from the category stage file, numbered 1..n in file
//! order. Changes made through the API live only as long as the server.

use crate::records::Category;
use crate::storage::read_json_array;
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A category with its API id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub url_absolute: String,
    pub url_relative: String,
}

/// Request body for creating or replacing a category
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryPayload {
    pub name: String,
    pub url_absolute: String,
    pub url_relative: String,
}

#[derive(Debug, Default)]
pub struct CategoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl CategoryCatalog {
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let entries = categories
            .into_iter()
            .zip(1..)
            .map(|(category, id)| CatalogEntry {
                id,
                name: category.name,
                url_absolute: category.url_absolute,
                url_relative: category.url_relative,
            })
            .collect();
        Self { entries }
    }

    /// Loads the catalog from a category stage file
    ///
    /// A missing file yields an empty catalog. A malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        match read_json_array::<Category>(path)? {
            Some(categories) => {
                tracing::info!("Loaded {} categories from {}", categories.len(), path.display());
                Ok(Self::from_categories(categories))
            }
            None => {
                tracing::warn!(
                    "Category file {} not found, serving an empty catalog",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Appends a category under the next free id
    pub fn create(&mut self, payload: CategoryPayload) -> CatalogEntry {
        let id = self.entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        let entry = CatalogEntry {
            id,
            name: payload.name.trim().to_string(),
            url_absolute: payload.url_absolute,
            url_relative: payload.url_relative,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Replaces the category with `id`; `None` if absent
    pub fn update(&mut self, id: i64, payload: CategoryPayload) -> Option<CatalogEntry> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        entry.name = payload.name.trim().to_string();
        entry.url_absolute = payload.url_absolute;
        entry.url_relative = payload.url_relative;
        Some(entry.clone())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}
