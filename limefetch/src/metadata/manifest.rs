//! Parsing of kernel-module manifest documents.

use std::collections::HashMap;

use super::xml::Element;
use super::{ManifestTable, ModuleRecord};
use crate::error::{RepositoryError, RepositoryResult};

/// Document name used in parse-error context.
const MANIFEST_CONTEXT: &str = "module manifest";

/// Parse a decompressed manifest document into a version-keyed table.
///
/// The root `modules` element contains one module entry per child; each
/// becomes a [`ModuleRecord`] keyed by its `version` field. A duplicate
/// version overwrites the earlier entry.
///
/// # Errors
///
/// Returns [`RepositoryError::MetadataParse`] for malformed XML or a module
/// entry missing a required field.
pub fn parse_manifest(xml: &[u8]) -> RepositoryResult<ManifestTable> {
    decode_manifest(xml).map_err(|reason| RepositoryError::MetadataParse {
        context: MANIFEST_CONTEXT.to_string(),
        reason,
    })
}

fn decode_manifest(xml: &[u8]) -> Result<ManifestTable, String> {
    let root = Element::parse(xml)?;
    if root.name != "modules" {
        return Err(format!("expected <modules> root, found <{}>", root.name));
    }

    let mut table = HashMap::new();
    for module in &root.children {
        let record = decode_record(module)?;
        table.insert(record.version.clone(), record);
    }

    Ok(table)
}

fn decode_record(module: &Element) -> Result<ModuleRecord, String> {
    Ok(ModuleRecord {
        module_type: module.require_attr("type")?.to_string(),
        name: module.require_child_text("name")?.to_string(),
        arch: module.require_child_text("arch")?.to_string(),
        checksum: module.require_child_text("checksum")?.to_string(),
        version: module.require_child_text("version")?.to_string(),
        packager: module.require_child_text("packager")?.to_string(),
        location: module
            .require_child("location")?
            .require_attr("href")?
            .to_string(),
        signature: module
            .require_child("signature")?
            .require_attr("href")?
            .to_string(),
        platform: module.require_child_text("platform")?.to_string(),
    })
}
