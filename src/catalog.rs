//! Vendor request templates and their display descriptors.
//!
//! The catalog is assembled by the build script from `resources/catalog.json`
//! and the `.http` files next to it, compressed into the binary, and inflated
//! once on first access. Listing order is the order a selection UI shows.

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};

use crate::embedded;
use crate::error::{CatalogError, RequestError};
use crate::request::{Modality, RequestTemplate, FILE_MARKER, IMAGE_MARKER};

/// Token standing in for the origin that serves the self-probe endpoints.
pub const BASE_URL_MARKER: &str = "<<BASE_URL>>";

static ENTRIES: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    load_embedded().expect("embedded catalog is validated by the build script")
});

/// Display metadata for one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    /// Prompt capacity offered for this integration.
    pub prompts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    pub template: String,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn has_image(&self) -> bool {
        has_image_marker(&self.template)
    }

    pub fn has_files(&self) -> bool {
        has_file_marker(&self.template)
    }

    /// Template text addressed at `base_url` for the self-hosted entries.
    pub fn render_for(&self, base_url: &str) -> String {
        self.template
            .replace(BASE_URL_MARKER, &normalize_base_url(base_url))
    }

    pub fn request(&self, base_url: &str) -> Result<RequestTemplate, RequestError> {
        RequestTemplate::parse(&self.render_for(base_url))
    }
}

/// Inflates and parses the catalog compiled into the binary.
pub fn load_embedded() -> Result<Vec<CatalogEntry>, CatalogError> {
    let (bytes, expected) = embedded::catalog_payload();
    if bytes.is_empty() {
        return Err(CatalogError::MissingPayload);
    }
    let mut decoder = flate2::read::ZlibDecoder::new(Cursor::new(bytes));
    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload)?;

    let actual = format!("{:x}", Sha256::digest(&payload));
    if actual != expected {
        return Err(CatalogError::DigestMismatch {
            expected: expected.to_string(),
            actual,
        });
    }

    let entries: Vec<CatalogEntry> = serde_json::from_slice(&payload)?;
    debug!("loaded {} catalog entries", entries.len());
    Ok(entries)
}

pub fn entries() -> &'static [CatalogEntry] {
    &ENTRIES
}

pub fn templates() -> Vec<&'static str> {
    ENTRIES.iter().map(|entry| entry.template.as_str()).collect()
}

pub fn descriptors() -> Vec<&'static Descriptor> {
    ENTRIES.iter().map(|entry| &entry.descriptor).collect()
}

pub fn get(index: usize) -> Option<&'static CatalogEntry> {
    ENTRIES.get(index)
}

/// Looks an entry up by display name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    ENTRIES
        .iter()
        .find(|entry| entry.descriptor.name.eq_ignore_ascii_case(name))
}

pub fn has_image_marker(template: &str) -> bool {
    template.contains(IMAGE_MARKER)
}

pub fn has_file_marker(template: &str) -> bool {
    template.contains(FILE_MARKER)
}

/// Drops one trailing `/` and the first `/#` fragment marker.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.strip_suffix('/').unwrap_or(url);
    url.replacen("/#", "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_slash_then_fragment() {
        assert_eq!(normalize_base_url("http://localhost:8718/"), "http://localhost:8718");
        assert_eq!(normalize_base_url("http://localhost:8718/#/"), "http://localhost:8718");
        assert_eq!(normalize_base_url("http://localhost:8718"), "http://localhost:8718");
    }
}
