// Signature data model shared by the enumerator, the arm synthesizer and the verifier.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Value kinds
// ---------------------------------------------------------------------------

/// Native scalar kind of one parameter or return slot.
///
/// `Pointer` only shows up as a *matched* kind in the raw convention: it shares
/// the 32-bit representation with `I32` at the call level but is a distinct
/// import kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    I32,
    F32,
    I64,
    F64,
    Pointer,
}

impl ValueType {
    /// The numeric alphabet, in enumeration order.
    pub const NUMERIC: [ValueType; 4] = [ValueType::I32, ValueType::F32, ValueType::I64, ValueType::F64];

    /// Rust primitive carrying this kind across the C ABI.
    pub fn native(self) -> &'static str {
        match self {
            ValueType::I32 | ValueType::Pointer => "i32",
            ValueType::F32 => "f32",
            ValueType::I64 => "i64",
            ValueType::F64 => "f64",
        }
    }

    /// Variant name as written in generated patterns (`ValType::I32`, `ParamType::Pointer`).
    pub fn variant(self) -> &'static str {
        match self {
            ValueType::I32 => "I32",
            ValueType::F32 => "F32",
            ValueType::I64 => "I64",
            ValueType::F64 => "F64",
            ValueType::Pointer => "Pointer",
        }
    }

    pub fn width(self) -> Width {
        Width::of(self)
    }

    /// Inverse of [`ValueType::variant`].
    pub fn from_variant(name: &str) -> Option<ValueType> {
        match name {
            "I32" => Some(ValueType::I32),
            "F32" => Some(ValueType::F32),
            "I64" => Some(ValueType::I64),
            "F64" => Some(ValueType::F64),
            "Pointer" => Some(ValueType::Pointer),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Pointer => write!(f, "ptr"),
            other => write!(f, "{}", other.native()),
        }
    }
}

/// Width class used by the raw convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    W32,
    W64,
}

impl Width {
    /// The width alphabet, in enumeration order.
    pub const ALL: [Width; 2] = [Width::W32, Width::W64];

    pub fn of(ty: ValueType) -> Width {
        match ty {
            ValueType::I32 | ValueType::F32 | ValueType::Pointer => Width::W32,
            ValueType::I64 | ValueType::F64 => Width::W64,
        }
    }

    /// Import kinds a slot of this width accepts.
    pub fn kinds(self) -> &'static [ValueType] {
        match self {
            Width::W32 => &[ValueType::I32, ValueType::F32, ValueType::Pointer],
            Width::W64 => &[ValueType::I64, ValueType::F64],
        }
    }

    /// Integer carrier: always `"i" + width`.
    pub fn native(self) -> &'static str {
        match self {
            Width::W32 => "i32",
            Width::W64 => "i64",
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::W32 => write!(f, "w32"),
            Width::W64 => write!(f, "w64"),
        }
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Typed-closure convention signature: exact kinds per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedSignature {
    pub params: Vec<ValueType>,
    pub result: Option<ValueType>,
}

/// Raw stack-slot convention signature: width classes per parameter, exact return kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawSignature {
    pub params: Vec<Width>,
    pub result: Option<ValueType>,
}

impl TypedSignature {
    pub fn new(params: Vec<ValueType>, result: Option<ValueType>) -> Self {
        Self { params, result }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl RawSignature {
    pub fn new(params: Vec<Width>, result: Option<ValueType>) -> Self {
        Self { params, result }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn write_shape<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    params: &[T],
    result: Option<ValueType>,
) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{p}")?;
    }
    match result {
        Some(r) => write!(f, ") -> {r}"),
        None => write!(f, ") -> ()"),
    }
}

impl fmt::Display for TypedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shape(f, &self.params, self.result)
    }
}

impl fmt::Display for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shape(f, &self.params, self.result)
    }
}

// ---------------------------------------------------------------------------
// Convention
// ---------------------------------------------------------------------------

/// Which calling convention a dispatch table is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// Typed closures registered with `Linker::func_wrap`.
    Typed,
    /// Raw slot arrays registered with `Linker::func_new_unchecked`.
    Raw,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Typed => write!(f, "typed"),
            Convention::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for Convention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "typed" => Ok(Convention::Typed),
            "raw" => Ok(Convention::Raw),
            other => Err(format!("unknown convention `{other}` (expected `typed` or `raw`)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_classes_partition_kinds() {
        for ty in [ValueType::I32, ValueType::F32, ValueType::Pointer] {
            assert_eq!(ty.width(), Width::W32);
            assert!(Width::W32.kinds().contains(&ty));
        }
        for ty in [ValueType::I64, ValueType::F64] {
            assert_eq!(ty.width(), Width::W64);
            assert!(Width::W64.kinds().contains(&ty));
        }
        assert_eq!(Width::W32.native(), "i32");
        assert_eq!(Width::W64.native(), "i64");
    }

    #[test]
    fn pointer_carries_as_i32() {
        assert_eq!(ValueType::Pointer.native(), "i32");
        assert_eq!(ValueType::from_variant("Pointer"), Some(ValueType::Pointer));
        assert_eq!(ValueType::from_variant("V128"), None);
    }

    #[test]
    fn display_shapes() {
        let sig = TypedSignature::new(vec![ValueType::I32, ValueType::F64], Some(ValueType::F32));
        assert_eq!(sig.to_string(), "(i32, f64) -> f32");
        let sig = RawSignature::new(vec![], None);
        assert_eq!(sig.to_string(), "() -> ()");
        let sig = RawSignature::new(vec![Width::W32, Width::W64], Some(ValueType::I64));
        assert_eq!(sig.to_string(), "(w32, w64) -> i64");
    }

    #[test]
    fn convention_round_trips_through_str() {
        assert_eq!("typed".parse::<Convention>(), Ok(Convention::Typed));
        assert_eq!("raw".parse::<Convention>(), Ok(Convention::Raw));
        assert!("variadic".parse::<Convention>().is_err());
        assert_eq!(Convention::Raw.to_string(), "raw");
    }
}
