//! Texture handle resolution by name.
//!
//! The game never touches pixel data; it registers sprite names up front
//! and resolves them to opaque [`TextureId`] handles at draw time. A
//! missing texture resolves to `None` and the caller simply skips the
//! icon.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::TextureId;

/// Errors from loading a texture manifest.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid texture manifest: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("duplicate texture name in manifest: {0}")]
    Duplicate(String),
}

/// RON manifest listing the sprite names an installation provides.
#[derive(Debug, Deserialize)]
struct Manifest {
    textures: Vec<String>,
}

/// Name to handle table for all loaded sprites.
#[derive(Debug, Default)]
pub struct TextureCatalog {
    by_name: HashMap<String, TextureId>,
    next_id: u32,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a RON manifest string.
    pub fn from_manifest(source: &str) -> Result<Self, CatalogError> {
        let manifest: Manifest = ron::from_str(source)?;
        let mut catalog = Self::new();
        for name in manifest.textures {
            if catalog.by_name.contains_key(&name) {
                return Err(CatalogError::Duplicate(name));
            }
            catalog.register(&name);
        }
        Ok(catalog)
    }

    /// Register a sprite name, returning its handle. Registering the same
    /// name twice returns the existing handle.
    pub fn register(&mut self, name: &str) -> TextureId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a sprite by name. Unknown names are a soft failure: the
    /// icon is simply not drawn.
    pub fn resolve(&self, name: &str) -> Option<TextureId> {
        let id = self.by_name.get(name).copied();
        if id.is_none() {
            log::warn!("texture not found: {name}");
        }
        id
    }

    /// Like [`resolve`](Self::resolve) but silent, for optional variants
    /// (e.g. the tinted radar version of a map image).
    pub fn resolve_optional(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
