//! Constants generated by `build.rs` from `resources/catalog.json`.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/catalog.rs"));
}

static BUILD_INFO: Lazy<BuildInfo> = Lazy::new(|| {
    serde_json::from_str(generated::BUILD_INFO_JSON).expect("build script emits valid build info")
});

#[derive(Debug, Clone, Deserialize)]
pub struct BuildInfo {
    pub schema_version: u32,
    pub package_version: String,
    pub rustc_version: String,
    pub build_timestamp_utc: String,
    pub catalog_sha256: String,
    pub entry_count: usize,
    /// Entry count per modality tag; untagged entries count as `Text`.
    pub modalities: BTreeMap<String, usize>,
}

/// Zlib-compressed catalog payload and the SHA-256 of its inflated form.
pub(crate) fn catalog_payload() -> (&'static [u8], &'static str) {
    (generated::CATALOG_BYTES, generated::CATALOG_SHA256)
}

pub fn build_info() -> &'static BuildInfo {
    &BUILD_INFO
}

pub fn build_info_json() -> &'static str {
    generated::BUILD_INFO_JSON
}
