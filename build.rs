use chrono::Utc;
use flate2::{write::ZlibEncoder, Compression};
use rustc_version::version_meta;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const DEFAULT_MANIFEST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/catalog.json");
const SCHEMA_VERSION: u32 = 1;
const IMAGE_MARKER: &str = "<<BASE64_IMAGE>>";
const FILE_MARKER: &str = "multipart/form-data";

#[derive(Deserialize)]
struct ManifestEntry {
    name: String,
    prompts: u64,
    custom_instructions: Option<String>,
    modality: Option<String>,
    template: String,
}

#[derive(Serialize)]
struct EmbeddedEntry<'a> {
    name: &'a str,
    prompts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modality: Option<&'a str>,
    template: String,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=resources/catalog.json");
    println!("cargo:rerun-if-changed=resources/templates");
    println!("cargo:rerun-if-env-changed=CATALOG_MANIFEST_PATH");

    let manifest_path = env::var("CATALOG_MANIFEST_PATH").unwrap_or_else(|_| DEFAULT_MANIFEST.to_string());
    let raw = fs::read(&manifest_path).unwrap_or_else(|err| {
        panic!("Failed to read catalog manifest '{manifest_path}': {err}");
    });

    let manifest: Vec<ManifestEntry> = serde_json::from_slice(&raw).unwrap_or_else(|err| {
        panic!("Catalog manifest must be a JSON array of entries: {err}");
    });
    if manifest.is_empty() {
        panic!("Catalog manifest cannot be empty");
    }

    let template_dir = Path::new(&manifest_path)
        .parent()
        .map(|dir| dir.join("templates"))
        .expect("manifest path has a parent directory");

    let mut seen = BTreeSet::new();
    let mut entries = Vec::with_capacity(manifest.len());
    for entry in &manifest {
        if entry.name.trim().is_empty() {
            panic!("Each catalog entry must declare a non-empty name");
        }
        if !seen.insert(entry.name.to_lowercase()) {
            panic!("Duplicate catalog entry name '{}'", entry.name);
        }

        let template_path = template_dir.join(&entry.template);
        println!("cargo:rerun-if-changed={}", template_path.display());
        let template = fs::read_to_string(&template_path).unwrap_or_else(|err| {
            panic!(
                "Failed to read template '{}' for '{}': {err}",
                template_path.display(),
                entry.name
            );
        });
        if template.trim().is_empty() {
            panic!("Template for '{}' is empty", entry.name);
        }

        match entry.modality.as_deref() {
            Some("Image") if !template.contains(IMAGE_MARKER) => {
                panic!("'{}' is tagged Image but lacks {IMAGE_MARKER}", entry.name)
            }
            Some("Files") if !template.contains(FILE_MARKER) => {
                panic!("'{}' is tagged Files but lacks {FILE_MARKER}", entry.name)
            }
            Some("Image") | Some("Files") | Some("Text") | Some("Audio") | Some("Mixed") | None => {}
            Some(other) => panic!("'{}' declares unknown modality '{other}'", entry.name),
        }

        entries.push(EmbeddedEntry {
            name: &entry.name,
            prompts: entry.prompts,
            custom_instructions: entry.custom_instructions.as_deref(),
            modality: entry.modality.as_deref(),
            template,
        });
    }

    let payload = serde_json::to_vec(&entries).expect("catalog entries serialize");

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&payload).expect("compression failed");
    let compressed = encoder.finish().expect("compression finalize failed");

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    let digest = format!("{:x}", hasher.finalize());

    let modalities: BTreeMap<&str, usize> =
        entries.iter().fold(BTreeMap::new(), |mut counts, entry| {
            *counts.entry(entry.modality.unwrap_or("Text")).or_default() += 1;
            counts
        });

    let build_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "package_version": env!("CARGO_PKG_VERSION"),
        "rustc_version": version_meta().expect("failed to obtain rustc version").short_version_string,
        "build_timestamp_utc": Utc::now().to_rfc3339(),
        "catalog_sha256": digest,
        "entry_count": entries.len(),
        "modalities": modalities,
    });

    let generated = format!(
        "pub const CATALOG_BYTES: &[u8] = &{compressed:?};\n\
         pub const CATALOG_SHA256: &str = {digest:?};\n\
         pub const BUILD_INFO_JSON: &str = r#\"{build_info}\"#;\n"
    );
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    fs::write(out_dir.join("catalog.rs"), generated).expect("failed to write catalog.rs");
}
