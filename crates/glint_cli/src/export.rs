//! Split a loaded container into a text asset plus a sibling payload file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glint_core::document::{to_string_pretty, Map, Value};

/// Paths written by [`export_split`].
#[derive(Debug)]
pub struct Exported {
    pub document: PathBuf,
    pub payload: PathBuf,
}

/// Write `<stem>.bin` and `<stem>.gltf` next to `source`.
///
/// The first buffer's `uri` is pointed at the `.bin` file so the text asset
/// can be opened on its own. A document without buffers gets one.
pub fn export_split(source: &Path, mut document: Value, blob: &[u8]) -> Result<Exported> {
    let payload = source.with_extension("bin");
    let text = source.with_extension("gltf");
    let uri = payload
        .file_name()
        .and_then(|n| n.to_str())
        .context("output file name is not valid UTF-8")?
        .to_string();

    set_buffer_uri(&mut document, uri, blob.len())?;

    fs::write(&payload, blob)
        .with_context(|| format!("Failed to write {}", payload.display()))?;
    fs::write(&text, to_string_pretty(&document))
        .with_context(|| format!("Failed to write {}", text.display()))?;

    log::info!("Exported {} and {}", text.display(), payload.display());

    Ok(Exported {
        document: text,
        payload,
    })
}

fn set_buffer_uri(document: &mut Value, uri: String, byte_length: usize) -> Result<()> {
    if !document.contains_key("buffers") {
        let mut buffer = Map::new();
        buffer.insert("byteLength".to_string(), Value::from(byte_length as i64));
        document.insert("buffers", vec![Value::Object(buffer)])?;
    }

    document
        .get_mut("buffers")?
        .at_mut(0)?
        .insert("uri", uri)
        .context("buffers[0] is not an object")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::parse_file;

    #[test]
    fn test_export_rewrites_buffer_uri() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.glb");
        let document =
            glint_core::parse_document(r#"{"buffers": [{"byteLength": 4}], "asset": {"version": "2.0"}}"#)
                .unwrap();

        let out = export_split(&source, document, &[1, 2, 3, 4]).unwrap();

        assert_eq!(out.payload, dir.path().join("model.bin"));
        assert_eq!(fs::read(&out.payload).unwrap(), vec![1, 2, 3, 4]);

        let written = parse_file(&out.document).unwrap();
        let buffer = written.get("buffers").unwrap().at(0).unwrap();
        assert_eq!(buffer.get("uri").unwrap().as_str(), Ok("model.bin"));
        assert_eq!(buffer.get("byteLength").unwrap().as_i64(), Ok(4));
    }

    #[test]
    fn test_export_quote_in_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(r#"say "hi".glb"#);

        let out = export_split(&source, Value::Object(Map::new()), &[0; 4]).unwrap();

        let written = parse_file(&out.document).unwrap();
        let buffer = written.get("buffers").unwrap().at(0).unwrap();
        assert_eq!(buffer.get("uri").unwrap().as_str(), Ok(r#"say \"hi\".bin"#));
    }

    #[test]
    fn test_export_adds_missing_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("empty.glb");

        let out = export_split(&source, Value::Object(Map::new()), &[0; 8]).unwrap();

        let written = parse_file(&out.document).unwrap();
        let buffer = written.get("buffers").unwrap().at(0).unwrap();
        assert_eq!(buffer.get("uri").unwrap().as_str(), Ok("empty.bin"));
        assert_eq!(buffer.get("byteLength").unwrap().as_i64(), Ok(8));
    }
}
