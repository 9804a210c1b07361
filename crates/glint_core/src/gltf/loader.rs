//! File entry points and the loader error type.
//!
//! The whole pipeline is one blocking call chain:
//! read file → split container → parse document → resolve scene.

use std::path::Path;

use thiserror::Error;

use crate::document::{parse_document, ParseError, Value, ValueError};
use crate::scene::SceneGraph;

use super::container::{read_container, FormatError};
use super::resolver::resolve_scene;

/// Errors that can occur while loading or resolving an asset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Type error: {0}")]
    Type(#[from] ValueError),

    #[error("{kind} index {index} out of range ({len} available)")]
    Reference {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{what} spans bytes {offset}..{end}, past the {limit} bytes available")]
    ByteRange {
        what: String,
        offset: usize,
        end: usize,
        limit: usize,
    },

    #[error("accessor {index}: expected {expected}, found {found}")]
    AccessorMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("attribute {attribute} has {found} elements, need {expected}")]
    AttributeCount {
        attribute: String,
        expected: usize,
        found: usize,
    },

    #[error("{field} must hold {expected} numbers, found {found}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("in {kind} {index}: {source}")]
    Within {
        kind: &'static str,
        index: usize,
        #[source]
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Attach the entity being resolved when the error occurred.
    pub fn within(self, kind: &'static str, index: usize) -> Self {
        LoadError::Within {
            kind,
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping [`LoadError::Within`] wrappers.
    pub fn root_cause(&self) -> &LoadError {
        match self {
            LoadError::Within { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Read a `.glb` file and return its parsed document and binary payload.
///
/// # Example
///
/// ```ignore
/// use glint_core::{load_asset, resolve_scene};
///
/// let (doc, blob) = load_asset("models/fox.glb")?;
/// let scene = resolve_scene(&doc, &blob)?;
/// println!("{} meshes", scene.meshes.len());
/// ```
pub fn load_asset<P: AsRef<Path>>(path: P) -> LoadResult<(Value, Vec<u8>)> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("glb") {
        return Err(FormatError::WrongExtension(path.to_path_buf()).into());
    }

    let data = std::fs::read(path)?;
    let (text, blob) = read_container(&data)?.into_parts();
    let document = parse_document(&text)?;

    log::debug!("Loaded {} ({} byte payload)", path.display(), blob.len());

    Ok((document, blob))
}

/// Read and resolve a `.glb` file in one step.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<SceneGraph> {
    let (document, blob) = load_asset(path)?;
    resolve_scene(&document, &blob)
}

/// Parse a plain document file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> LoadResult<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_document(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_extension() {
        let err = load_asset("model.gltf").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Format(FormatError::WrongExtension(_))
        ));

        // A bare ".glb" is a dotfile without an extension
        assert!(matches!(
            load_asset(".glb").unwrap_err(),
            LoadError::Format(FormatError::WrongExtension(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_asset("/nonexistent/dir/model.glb").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_within_wraps_and_unwraps() {
        let err = LoadError::Unsupported("x".to_string())
            .within("primitive", 1)
            .within("mesh", 0);

        assert_eq!(err.to_string(), "in mesh 0: in primitive 1: Unsupported: x");
        assert!(matches!(err.root_cause(), LoadError::Unsupported(_)));
    }
}
