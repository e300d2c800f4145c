//! Per-dimension attribute values and the ordered list that attaches them
//! to a [`crate::node::Node`].

use crate::error::{PcError, PcResult};
use crate::schema::{Dimension, PrimitiveType, Schema};

/// Floating-point equality tolerance used by [`crate::filter::FilterOp::Equal`].
pub const EPSILON: f64 = 1e-7;

//------------ AttrValue ------------------------------------------------------

/// A tagged union over the ten primitive storage types, packed inline
/// rather than boxed: the largest variant is 8 bytes, so there is nothing
/// to gain from punning through a raw byte buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl AttrValue {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            AttrValue::I8(_) => PrimitiveType::I8,
            AttrValue::U8(_) => PrimitiveType::U8,
            AttrValue::I16(_) => PrimitiveType::I16,
            AttrValue::U16(_) => PrimitiveType::U16,
            AttrValue::I32(_) => PrimitiveType::I32,
            AttrValue::U32(_) => PrimitiveType::U32,
            AttrValue::I64(_) => PrimitiveType::I64,
            AttrValue::U64(_) => PrimitiveType::U64,
            AttrValue::F32(_) => PrimitiveType::F32,
            AttrValue::F64(_) => PrimitiveType::F64,
        }
    }

    /// The value, widened to `f64`, with no scale/offset applied.
    pub fn as_f64(&self) -> f64 {
        match *self {
            AttrValue::I8(v) => v as f64,
            AttrValue::U8(v) => v as f64,
            AttrValue::I16(v) => v as f64,
            AttrValue::U16(v) => v as f64,
            AttrValue::I32(v) => v as f64,
            AttrValue::U32(v) => v as f64,
            AttrValue::I64(v) => v as f64,
            AttrValue::U64(v) => v as f64,
            AttrValue::F32(v) => v as f64,
            AttrValue::F64(v) => v,
        }
    }

    /// Packs this value into its little-endian byte representation
    /// (§4.6), zero-extended to 8 bytes for uniform storage.
    pub fn to_packed_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        match self {
            AttrValue::I8(v) => out[..1].copy_from_slice(&v.to_le_bytes()),
            AttrValue::U8(v) => out[..1].copy_from_slice(&v.to_le_bytes()),
            AttrValue::I16(v) => out[..2].copy_from_slice(&v.to_le_bytes()),
            AttrValue::U16(v) => out[..2].copy_from_slice(&v.to_le_bytes()),
            AttrValue::I32(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            AttrValue::U32(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            AttrValue::I64(v) => out[..8].copy_from_slice(&v.to_le_bytes()),
            AttrValue::U64(v) => out[..8].copy_from_slice(&v.to_le_bytes()),
            AttrValue::F32(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            AttrValue::F64(v) => out[..8].copy_from_slice(&v.to_le_bytes()),
        }
        out
    }

    /// Unpacks a little-endian byte slice of exactly `ty.size()` bytes.
    pub fn from_packed_bytes(ty: PrimitiveType, bytes: &[u8]) -> PcResult<Self> {
        if bytes.len() != ty.size() {
            return Err(PcError::malformed(format!(
                "expected {} packed bytes for {:?}, got {}",
                ty.size(),
                ty,
                bytes.len()
            )));
        }
        Ok(match ty {
            PrimitiveType::I8 => AttrValue::I8(bytes[0] as i8),
            PrimitiveType::U8 => AttrValue::U8(bytes[0]),
            PrimitiveType::I16 => {
                AttrValue::I16(i16::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::U16 => {
                AttrValue::U16(u16::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::I32 => {
                AttrValue::I32(i32::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::U32 => {
                AttrValue::U32(u32::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::I64 => {
                AttrValue::I64(i64::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::U64 => {
                AttrValue::U64(u64::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::F32 => {
                AttrValue::F32(f32::from_le_bytes(bytes.try_into().unwrap()))
            }
            PrimitiveType::F64 => {
                AttrValue::F64(f64::from_le_bytes(bytes.try_into().unwrap()))
            }
        })
    }
}

//------------ Attribute ------------------------------------------------------

/// A single `(dimension, packed bytes)` pair living on a node's attribute
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    dimension: usize,
    value: AttrValue,
}

impl Attribute {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn value(&self) -> AttrValue {
        self.value
    }

    pub fn packed_bytes(&self) -> [u8; 8] {
        self.value.to_packed_bytes()
    }

    /// Quantizes `v` for `dim`: `(v - offset) / scale`, clamped to the
    /// dimension's primitive range and rounded to nearest representable
    /// value, per SPEC_FULL.md §3.
    pub fn new_from_double(dim: &Dimension, v: f64) -> PcResult<Self> {
        let raw = (v - dim.offset()) / dim.scale();
        let (lo, hi) = dim.primitive_type().range();
        let clamped = raw.clamp(lo, hi).round();
        let value = match dim.primitive_type() {
            PrimitiveType::I8 => AttrValue::I8(clamped as i8),
            PrimitiveType::U8 => AttrValue::U8(clamped as u8),
            PrimitiveType::I16 => AttrValue::I16(clamped as i16),
            PrimitiveType::U16 => AttrValue::U16(clamped as u16),
            PrimitiveType::I32 => AttrValue::I32(clamped as i32),
            PrimitiveType::U32 => AttrValue::U32(clamped as u32),
            PrimitiveType::I64 => AttrValue::I64(clamped as i64),
            PrimitiveType::U64 => AttrValue::U64(clamped as u64),
            PrimitiveType::F32 => AttrValue::F32(clamped as f32),
            PrimitiveType::F64 => AttrValue::F64(clamped),
        };
        Ok(Attribute { dimension: dim.position(), value })
    }

    /// Unpacks and applies `value * scale + offset`.
    pub fn get_value(&self, schema: &Schema) -> PcResult<f64> {
        let dim = schema.by_index(self.dimension)?;
        Ok(self.value.as_f64() * dim.scale() + dim.offset())
    }

    /// Builds an attribute directly from an already-decoded dimension index
    /// and value, bypassing quantization. Used by the codec when rehydrating
    /// a tree from the wire, where the bytes are already in packed form.
    pub fn from_raw(dimension: usize, value: AttrValue) -> Self {
        Attribute { dimension, value }
    }
}

//------------ AttributeList ---------------------------------------------------

/// An ordered, per-node attribute list: semantically a map from dimension
/// to packed value (at most one entry per dimension), implemented as a
/// small `Vec` rather than an intrusive linked list — see DESIGN.md.
pub type AttributeList = Vec<Attribute>;

/// Returns the attribute for `dim`, if present, via a linear scan.
pub fn get_by_dimension(list: &[Attribute], dim: usize) -> Option<&Attribute> {
    list.iter().find(|a| a.dimension == dim)
}

/// Produces a list containing every attribute of `a`, plus each attribute
/// of `b` whose dimension is not already present in `a`. Preserves the
/// order of `a`, then the order of the new entries from `b`. On a
/// dimension present in both, `a`'s entry wins (SPEC_FULL.md §9).
pub fn union(a: &[Attribute], b: &[Attribute]) -> AttributeList {
    let mut out = a.to_vec();
    for attr in b {
        if get_by_dimension(&out, attr.dimension).is_none() {
            out.push(attr.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Dimension;

    fn z_dim() -> Dimension {
        Dimension::new(2, "Z", "elevation", PrimitiveType::F64, 0.01, 0.0)
            .unwrap()
    }

    #[test]
    fn quantize_roundtrip_within_tolerance() {
        let dim = z_dim();
        let mut schema = Schema::new();
        schema
            .add_dimension(Dimension::new(0, "X", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        schema
            .add_dimension(Dimension::new(1, "Y", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        schema.add_dimension(dim.clone()).unwrap();

        for d in [1.0, 1.5, 99.9, -12.34] {
            let attr = Attribute::new_from_double(&dim, d).unwrap();
            let got = attr.get_value(&schema).unwrap();
            assert!(
                (got - d).abs() <= d.abs() * EPSILON + dim.scale() / 2.0,
                "d={d} got={got}"
            );
        }
    }

    #[test]
    fn quantize_out_of_range_is_clamped_not_erroring() {
        let dim = Dimension::new(0, "I", "", PrimitiveType::I8, 1.0, 0.0).unwrap();
        let attr = Attribute::new_from_double(&dim, 1000.0).unwrap();
        assert_eq!(attr.value(), AttrValue::I8(i8::MAX));
    }

    #[test]
    fn union_prefers_first_list_on_conflict() {
        let a = vec![Attribute { dimension: 2, value: AttrValue::F64(1.0) }];
        let b = vec![
            Attribute { dimension: 2, value: AttrValue::F64(99.0) },
            Attribute { dimension: 3, value: AttrValue::F64(7.0) },
        ];
        let merged = union(&a, &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(get_by_dimension(&merged, 2).unwrap().value(), AttrValue::F64(1.0));
        assert_eq!(get_by_dimension(&merged, 3).unwrap().value(), AttrValue::F64(7.0));
    }

    #[test]
    fn get_by_dimension_linear_scan() {
        let list = vec![
            Attribute { dimension: 2, value: AttrValue::F64(1.0) },
            Attribute { dimension: 4, value: AttrValue::F64(2.0) },
        ];
        assert!(get_by_dimension(&list, 4).is_some());
        assert!(get_by_dimension(&list, 9).is_none());
    }

    #[test]
    fn pack_unpack_roundtrip() {
        for v in [
            AttrValue::I8(-5),
            AttrValue::U16(4000),
            AttrValue::I32(-123456),
            AttrValue::F32(3.5),
            AttrValue::F64(-9.875),
        ] {
            let ty = v.primitive_type();
            let bytes = v.to_packed_bytes();
            let back =
                AttrValue::from_packed_bytes(ty, &bytes[..ty.size()]).unwrap();
            assert_eq!(v, back);
        }
    }
}
