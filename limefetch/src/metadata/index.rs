//! Parsing of the repository index document (`repomd.xml`).

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use super::xml::Element;
use super::{ManifestDescriptor, RepositoryIndex};
use crate::error::{RepositoryError, RepositoryResult};

/// Document name used in parse-error context.
const INDEX_CONTEXT: &str = "repository index";

/// Parse a repository index document.
///
/// The index carries one `revision` field and one-or-many `data` elements;
/// both forms yield the same mapping. Each `data` element becomes a
/// [`ManifestDescriptor`] keyed by its `type` attribute, a later duplicate
/// type overwriting the earlier entry.
///
/// # Errors
///
/// Returns [`RepositoryError::MetadataParse`] for malformed XML, a missing
/// field, or a field that fails coercion.
pub fn parse_index(xml: &[u8]) -> RepositoryResult<RepositoryIndex> {
    decode_index(xml).map_err(|reason| RepositoryError::MetadataParse {
        context: INDEX_CONTEXT.to_string(),
        reason,
    })
}

fn decode_index(xml: &[u8]) -> Result<RepositoryIndex, String> {
    let root = Element::parse(xml)?;
    let revision = root.require_child_text("revision")?.to_string();

    let mut manifests = HashMap::new();
    for data in root.children_named("data") {
        let descriptor = decode_descriptor(data)?;
        manifests.insert(descriptor.manifest_type.clone(), descriptor);
    }

    Ok(RepositoryIndex {
        revision,
        manifests,
    })
}

fn decode_descriptor(data: &Element) -> Result<ManifestDescriptor, String> {
    let manifest_type = data.require_attr("type")?.to_string();

    let timestamp_text = data.require_child_text("timestamp")?;
    let epoch_secs: i64 = timestamp_text.parse().map_err(|_| {
        format!(
            "invalid timestamp `{}` in <data type=\"{}\">",
            timestamp_text, manifest_type
        )
    })?;
    let timestamp = Utc
        .timestamp_opt(epoch_secs, 0)
        .single()
        .ok_or_else(|| {
            format!(
                "timestamp `{}` out of range in <data type=\"{}\">",
                timestamp_text, manifest_type
            )
        })?;

    Ok(ManifestDescriptor {
        checksum: data.require_child_text("checksum")?.to_string(),
        open_checksum: data.require_child_text("open_checksum")?.to_string(),
        location: data
            .require_child("location")?
            .require_attr("href")?
            .to_string(),
        timestamp,
        size: decode_size(data, &manifest_type, "size")?,
        open_size: decode_size(data, &manifest_type, "open_size")?,
        manifest_type,
    })
}

fn decode_size(data: &Element, manifest_type: &str, field: &str) -> Result<u64, String> {
    let text = data.require_child_text(field)?;
    text.parse().map_err(|_| {
        format!(
            "invalid {} `{}` in <data type=\"{}\">",
            field, text, manifest_type
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_element(manifest_type: &str, location: &str) -> String {
        format!(
            r#"<data type="{manifest_type}">
                 <checksum>aaa111</checksum>
                 <open_checksum>bbb222</open_checksum>
                 <location href="{location}"/>
                 <timestamp>1467062561</timestamp>
                 <size>1493</size>
                 <open_size>10240</open_size>
               </data>"#
        )
    }

    fn index_document(data: &[String]) -> Vec<u8> {
        format!(
            "<repomd><revision>1467062561</revision>{}</repomd>",
            data.join("")
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_single_data_element() {
        let doc = index_document(&[data_element("kernel", "repodata/kernel.xml.gz")]);
        let index = parse_index(&doc).unwrap();

        assert_eq!(index.revision, "1467062561");
        assert_eq!(index.manifests.len(), 1);

        let descriptor = &index.manifests["kernel"];
        assert_eq!(descriptor.manifest_type, "kernel");
        assert_eq!(descriptor.checksum, "aaa111");
        assert_eq!(descriptor.open_checksum, "bbb222");
        assert_eq!(descriptor.location, "repodata/kernel.xml.gz");
        assert_eq!(descriptor.timestamp.timestamp(), 1467062561);
        assert_eq!(descriptor.size, 1493);
        assert_eq!(descriptor.open_size, 10240);
    }

    #[test]
    fn test_single_and_list_forms_are_equivalent() {
        let single = parse_index(&index_document(&[data_element(
            "kernel",
            "repodata/kernel.xml.gz",
        )]))
        .unwrap();

        let multi = parse_index(&index_document(&[
            data_element("kernel", "repodata/kernel.xml.gz"),
            data_element("module", "repodata/module.xml.gz"),
        ]))
        .unwrap();

        assert_eq!(single.manifests["kernel"], multi.manifests["kernel"]);
        assert_eq!(multi.manifests.len(), 2);
        assert_eq!(multi.manifests["module"].location, "repodata/module.xml.gz");
    }

    #[test]
    fn test_duplicate_type_overwrites() {
        let index = parse_index(&index_document(&[
            data_element("kernel", "repodata/old.xml.gz"),
            data_element("kernel", "repodata/new.xml.gz"),
        ]))
        .unwrap();

        assert_eq!(index.manifests.len(), 1);
        assert_eq!(index.manifests["kernel"].location, "repodata/new.xml.gz");
    }

    #[test]
    fn test_missing_revision() {
        let doc = format!(
            "<repomd>{}</repomd>",
            data_element("kernel", "repodata/kernel.xml.gz")
        );

        match parse_index(doc.as_bytes()) {
            Err(RepositoryError::MetadataParse { context, reason }) => {
                assert_eq!(context, "repository index");
                assert!(reason.contains("`revision`"));
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_missing_checksum_field() {
        let doc = br#"<repomd>
            <revision>1</revision>
            <data type="kernel">
              <open_checksum>bbb</open_checksum>
              <location href="repodata/kernel.xml.gz"/>
              <timestamp>1467062561</timestamp>
              <size>1</size>
              <open_size>2</open_size>
            </data>
          </repomd>"#;

        match parse_index(doc) {
            Err(RepositoryError::MetadataParse { reason, .. }) => {
                assert!(reason.contains("`checksum`"));
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_missing_location_href() {
        let doc = br#"<repomd>
            <revision>1</revision>
            <data type="kernel">
              <checksum>aaa</checksum>
              <open_checksum>bbb</open_checksum>
              <location/>
              <timestamp>1467062561</timestamp>
              <size>1</size>
              <open_size>2</open_size>
            </data>
          </repomd>"#;

        match parse_index(doc) {
            Err(RepositoryError::MetadataParse { reason, .. }) => {
                assert!(reason.contains("`href`"));
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_invalid_timestamp() {
        let doc = br#"<repomd>
            <revision>1</revision>
            <data type="kernel">
              <checksum>aaa</checksum>
              <open_checksum>bbb</open_checksum>
              <location href="repodata/kernel.xml.gz"/>
              <timestamp>not-a-number</timestamp>
              <size>1</size>
              <open_size>2</open_size>
            </data>
          </repomd>"#;

        match parse_index(doc) {
            Err(RepositoryError::MetadataParse { reason, .. }) => {
                assert!(reason.contains("invalid timestamp"));
                assert!(reason.contains("kernel"));
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_invalid_size() {
        let doc = br#"<repomd>
            <revision>1</revision>
            <data type="kernel">
              <checksum>aaa</checksum>
              <open_checksum>bbb</open_checksum>
              <location href="repodata/kernel.xml.gz"/>
              <timestamp>1467062561</timestamp>
              <size>lots</size>
              <open_size>2</open_size>
            </data>
          </repomd>"#;

        match parse_index(doc) {
            Err(RepositoryError::MetadataParse { reason, .. }) => {
                assert!(reason.contains("invalid size"));
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_malformed_xml() {
        match parse_index(b"<repomd><revision>1</revision") {
            Err(RepositoryError::MetadataParse { context, .. }) => {
                assert_eq!(context, "repository index");
            }
            _ => panic!("expected MetadataParse error"),
        }
    }

    #[test]
    fn test_empty_index_has_no_manifests() {
        let index = parse_index(b"<repomd><revision>5</revision></repomd>").unwrap();
        assert!(index.manifests.is_empty());
    }
}
