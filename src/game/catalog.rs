//! Read-only mode → locations lookup.
//!
//! The catalog is a JSON object keyed by mode name, each value an array of
//! `{ "lat", "lng", "name" }` entries. It is loaded once at startup and never
//! mutated afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use super::types::Location;

/// Catalog shipped with the binary.
pub const BUNDLED_CATALOG: &str = include_str!("../../data/locations.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    modes: HashMap<String, Vec<Location>>,
}

impl LocationCatalog {
    pub fn new(modes: HashMap<String, Vec<Location>>) -> Self {
        Self { modes }
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let modes: HashMap<String, Vec<Location>> = serde_json::from_str(raw)?;
        Ok(Self::new(modes))
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        info!(
            "[Catalog] Loaded {} mode(s) from {}",
            catalog.modes.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Candidates for `mode`, in file order. Unknown modes have none.
    pub fn locations(&self, mode: &str) -> &[Location] {
        self.modes.get(mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Uniform pick among the mode's candidates, or `fallback` when there are none.
    pub fn pick<R: Rng + ?Sized>(&self, mode: &str, fallback: &Location, rng: &mut R) -> Location {
        match self.locations(mode).choose(rng) {
            Some(location) => location.clone(),
            None => {
                debug!("[Catalog] No locations for mode {:?}, using fallback", mode);
                fallback.clone()
            }
        }
    }
}
