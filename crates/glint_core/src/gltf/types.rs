//! Accessor and buffer-view descriptors.
//!
//! These are the indirection layer between the document and the binary
//! payload: an accessor names a buffer view plus an element layout, and a
//! buffer view names a byte range of the payload.

use std::fmt;

use crate::document::Value;

use super::loader::{LoadError, LoadResult};

/// Scalar storage type of accessor components (GL enum values).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    pub fn from_code(code: usize) -> Option<Self> {
        match code {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    pub fn code(self) -> usize {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }
}

/// Element shape of an accessor (the document's `type` string).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementShape {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Number of components per element.
    pub fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

impl fmt::Display for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A byte range within the binary payload.
///
/// Entities keep ranges instead of borrowed slices, so they can outlive the
/// resolution pass; [`ByteRange::slice`] re-borrows from the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: usize,
    pub length: usize,
}

impl ByteRange {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last byte, or `None` if that overflows `usize`.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }

    /// Borrow the range from `blob`, or `None` if it does not fit.
    pub fn slice<'a>(&self, blob: &'a [u8]) -> Option<&'a [u8]> {
        blob.get(self.offset..self.end()?)
    }
}

/// A byte range of the payload, possibly with a declared stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferView {
    pub range: ByteRange,
    pub byte_stride: Option<usize>,
}

impl BufferView {
    /// Read a buffer view entry and check that it lies inside a payload of
    /// `blob_len` bytes.
    pub fn from_value(value: &Value, index: usize, blob_len: usize) -> LoadResult<Self> {
        let offset = match value.find("byteOffset")? {
            Some(v) => v.as_usize()?,
            None => 0,
        };
        let length = value.get("byteLength")?.as_usize()?;
        let byte_stride = value.find("byteStride")?.map(Value::as_usize).transpose()?;

        let range = ByteRange::new(offset, length);
        match range.end() {
            Some(end) if end <= blob_len => {}
            end => {
                return Err(LoadError::ByteRange {
                    what: format!("bufferView {index}"),
                    offset,
                    end: end.unwrap_or(usize::MAX),
                    limit: blob_len,
                })
            }
        }

        Ok(Self { range, byte_stride })
    }
}

/// A typed array descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub buffer_view: usize,
    /// Offset relative to the start of the buffer view.
    pub byte_offset: usize,
    pub count: usize,
    pub component_type: ComponentType,
    pub shape: ElementShape,
}

impl Accessor {
    pub fn from_value(value: &Value) -> LoadResult<Self> {
        if value.contains_key("sparse") {
            return Err(LoadError::Unsupported("sparse accessors".to_string()));
        }

        let code = value.get("componentType")?.as_usize()?;
        let component_type = ComponentType::from_code(code)
            .ok_or_else(|| LoadError::Unsupported(format!("component type {code}")))?;

        let shape_name = value.get("type")?.as_str()?;
        let shape = ElementShape::parse(shape_name)
            .ok_or_else(|| LoadError::Unsupported(format!("accessor type \"{shape_name}\"")))?;

        let byte_offset = match value.find("byteOffset")? {
            Some(v) => v.as_usize()?,
            None => 0,
        };

        Ok(Self {
            buffer_view: value.get("bufferView")?.as_usize()?,
            byte_offset,
            count: value.get("count")?.as_usize()?,
            component_type,
            shape,
        })
    }

    /// Tightly packed size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.shape.components() * self.component_type.size()
    }

    /// Total number of scalar components (`count * components`), or `None`
    /// if a bogus count overflows.
    pub fn component_count(&self) -> Option<usize> {
        self.count.checked_mul(self.shape.components())
    }

    /// Total size of the accessor's data in bytes, or `None` on overflow.
    pub fn byte_length(&self) -> Option<usize> {
        self.count.checked_mul(self.element_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn test_accessor_from_value() {
        let v = parse_document(
            r#"{"bufferView": 2, "count": 3, "componentType": 5126, "type": "VEC3"}"#,
        )
        .unwrap();
        let accessor = Accessor::from_value(&v).unwrap();

        assert_eq!(accessor.buffer_view, 2);
        assert_eq!(accessor.byte_offset, 0);
        assert_eq!(accessor.component_type, ComponentType::Float);
        assert_eq!(accessor.shape, ElementShape::Vec3);
        assert_eq!(accessor.component_count(), Some(9));
        assert_eq!(accessor.byte_length(), Some(36));
    }

    #[test]
    fn test_accessor_rejects_unknown_layouts() {
        let v = parse_document(
            r#"{"bufferView": 0, "count": 1, "componentType": 1234, "type": "VEC3"}"#,
        )
        .unwrap();
        assert!(matches!(
            Accessor::from_value(&v),
            Err(LoadError::Unsupported(_))
        ));

        let v = parse_document(
            r#"{"bufferView": 0, "count": 1, "componentType": 5126, "type": "VEC9"}"#,
        )
        .unwrap();
        assert!(matches!(
            Accessor::from_value(&v),
            Err(LoadError::Unsupported(_))
        ));
    }

    #[test]
    fn test_accessor_missing_key() {
        let v = parse_document(r#"{"count": 1, "componentType": 5126, "type": "SCALAR"}"#).unwrap();
        assert!(matches!(Accessor::from_value(&v), Err(LoadError::Type(_))));
    }

    #[test]
    fn test_buffer_view_bounds() {
        let v = parse_document(r#"{"byteOffset": 8, "byteLength": 8}"#).unwrap();
        let view = BufferView::from_value(&v, 0, 16).unwrap();
        assert_eq!(view.range, ByteRange::new(8, 8));

        let err = BufferView::from_value(&v, 3, 15).unwrap_err();
        assert!(matches!(err, LoadError::ByteRange { end: 16, limit: 15, .. }));
    }

    #[test]
    fn test_oversized_counts_do_not_overflow() {
        let v = parse_document(
            r#"{"bufferView": 0, "count": 4611686018427387904, "componentType": 5126, "type": "VEC3"}"#,
        )
        .unwrap();
        let accessor = Accessor::from_value(&v).unwrap();
        assert_eq!(accessor.byte_length(), None);

        let v = parse_document(r#"{"byteOffset": 9223372036854775807, "byteLength": 9223372036854775807}"#)
            .unwrap();
        let err = BufferView::from_value(&v, 0, 16).unwrap_err();
        assert!(matches!(err, LoadError::ByteRange { limit: 16, .. }));
    }

    #[test]
    fn test_buffer_view_default_offset() {
        let v = parse_document(r#"{"byteLength": 4, "byteStride": 12}"#).unwrap();
        let view = BufferView::from_value(&v, 0, 4).unwrap();
        assert_eq!(view.range.offset, 0);
        assert_eq!(view.byte_stride, Some(12));
    }

    #[test]
    fn test_shape_components() {
        assert_eq!(ElementShape::parse("SCALAR").unwrap().components(), 1);
        assert_eq!(ElementShape::parse("VEC2").unwrap().components(), 2);
        assert_eq!(ElementShape::parse("MAT4").unwrap().components(), 16);
        assert_eq!(ElementShape::Vec4.to_string(), "VEC4");
    }

    #[test]
    fn test_byte_range_slice() {
        let blob = [0u8, 1, 2, 3, 4];
        assert_eq!(ByteRange::new(1, 3).slice(&blob), Some(&blob[1..4]));
        assert_eq!(ByteRange::new(3, 3).slice(&blob), None);
        assert_eq!(ByteRange::new(usize::MAX, 1).slice(&blob), None);
    }
}
