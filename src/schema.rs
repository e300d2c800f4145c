//! The schema model: named, typed, scaled/offset numeric channels
//! ([`Dimension`]) collected into an insertion-ordered [`Schema`].

use num_traits::{Bounded, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{PcError, PcResult};

fn int_range<T: Bounded + ToPrimitive>() -> (f64, f64) {
    (
        T::min_value().to_f64().expect("integer bound fits in f64"),
        T::max_value().to_f64().expect("integer bound fits in f64"),
    )
}

//------------ PrimitiveType --------------------------------------------------

/// The ten primitive storage types a [`Dimension`] may hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum PrimitiveType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveType {
    /// Packed width in bytes. Never exceeds 8, per SPEC_FULL.md §3.
    pub fn size(self) -> usize {
        match self {
            PrimitiveType::I8 | PrimitiveType::U8 => 1,
            PrimitiveType::I16 | PrimitiveType::U16 => 2,
            PrimitiveType::I32 | PrimitiveType::U32 | PrimitiveType::F32 => 4,
            PrimitiveType::I64
            | PrimitiveType::U64
            | PrimitiveType::F64 => 8,
        }
    }

    /// The `[min, max]` representable range as `f64`, used to clamp a
    /// quantized value before packing. `F32`/`F64` are unbounded in
    /// practice; we use the finite extremes to keep the clamp total.
    pub fn range(self) -> (f64, f64) {
        match self {
            PrimitiveType::I8 => int_range::<i8>(),
            PrimitiveType::U8 => int_range::<u8>(),
            PrimitiveType::I16 => int_range::<i16>(),
            PrimitiveType::U16 => int_range::<u16>(),
            PrimitiveType::I32 => int_range::<i32>(),
            PrimitiveType::U32 => int_range::<u32>(),
            PrimitiveType::I64 => int_range::<i64>(),
            PrimitiveType::U64 => int_range::<u64>(),
            PrimitiveType::F32 => (f32::MIN as f64, f32::MAX as f64),
            PrimitiveType::F64 => (f64::MIN, f64::MAX),
        }
    }

    /// The XML `<pc:interpretation>` spelling for this type (§6).
    pub fn xml_name(self) -> &'static str {
        match self {
            PrimitiveType::I8 => "int8_t",
            PrimitiveType::U8 => "uint8_t",
            PrimitiveType::I16 => "int16_t",
            PrimitiveType::U16 => "uint16_t",
            PrimitiveType::I32 => "int32_t",
            PrimitiveType::U32 => "uint32_t",
            PrimitiveType::I64 => "int64_t",
            PrimitiveType::U64 => "uint64_t",
            PrimitiveType::F64 => "double",
            PrimitiveType::F32 => "float",
        }
    }

    pub fn from_xml_name(name: &str) -> PcResult<Self> {
        Ok(match name {
            "int8_t" => PrimitiveType::I8,
            "uint8_t" => PrimitiveType::U8,
            "int16_t" => PrimitiveType::I16,
            "uint16_t" => PrimitiveType::U16,
            "int32_t" => PrimitiveType::I32,
            "uint32_t" => PrimitiveType::U32,
            "int64_t" => PrimitiveType::I64,
            "uint64_t" => PrimitiveType::U64,
            "double" => PrimitiveType::F64,
            "float" => PrimitiveType::F32,
            other => {
                return Err(PcError::unsupported(format!(
                    "unrecognized dimension interpretation '{other}'"
                )))
            }
        })
    }
}

//------------ Dimension ------------------------------------------------------

/// A named, typed, scaled/offset numeric channel.
///
/// Stored (packed) values relate to physical values by
/// `physical = packed * scale + offset`; see [`crate::attribute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    position: usize,
    name: String,
    description: String,
    primitive_type: PrimitiveType,
    scale: f64,
    offset: f64,
}

impl Dimension {
    /// Creates a new dimension. `scale` must be non-zero.
    pub fn new(
        position: usize,
        name: impl Into<String>,
        description: impl Into<String>,
        primitive_type: PrimitiveType,
        scale: f64,
        offset: f64,
    ) -> PcResult<Self> {
        if scale == 0.0 {
            return Err(PcError::range("dimension scale must be non-zero"));
        }
        Ok(Dimension {
            position,
            name: name.into(),
            description: description.into(),
            primitive_type,
            scale,
            offset,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

//------------ Schema ----------------------------------------------------------

/// An insertion-ordered, name-unique list of [`Dimension`]s.
///
/// By convention the first two dimensions are named `X` and `Y`; the tree's
/// geohash fragments carry that spatial information, so attributes are
/// never stored for those two positions (see [`crate::compactor`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    dimensions: Vec<Dimension>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { dimensions: Vec::new() }
    }

    /// Appends `dim` to the schema. Fails with [`PcError::Invariant`] if its
    /// name is already present.
    pub fn add_dimension(&mut self, dim: Dimension) -> PcResult<()> {
        if self.dimensions.iter().any(|d| d.name == dim.name) {
            return Err(PcError::invariant(format!(
                "duplicate dimension name '{}'",
                dim.name
            )));
        }
        self.dimensions.push(dim);
        Ok(())
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn by_name(&self, name: &str) -> PcResult<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name).ok_or_else(|| {
            PcError::not_found(format!("dimension '{name}' not in schema"))
        })
    }

    pub fn by_index(&self, index: usize) -> PcResult<&Dimension> {
        self.dimensions.get(index).ok_or_else(|| {
            PcError::not_found(format!("dimension index {index} not in schema"))
        })
    }
}
