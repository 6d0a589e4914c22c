// Import-side parameter kinds for raw bindings.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use wasmtime::{Engine, FuncType, ValType};

/// Kind of one raw-binding parameter or result, as the embedder declares it.
///
/// `Pointer` is an `i32` guest address at the WASM level; it is kept separate
/// so manifests can say what a slot means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    I32,
    F32,
    I64,
    F64,
    Pointer,
}

impl ParamType {
    /// WASM value type used in the declared import type.
    pub fn val(self) -> ValType {
        match self {
            ParamType::I32 | ParamType::Pointer => ValType::I32,
            ParamType::F32 => ValType::F32,
            ParamType::I64 => ValType::I64,
            ParamType::F64 => ValType::F64,
        }
    }

    /// Slot width in bits: 32 for `I32`, `F32` and `Pointer`, 64 otherwise.
    pub fn width(self) -> u32 {
        match self {
            ParamType::I64 | ParamType::F64 => 64,
            _ => 32,
        }
    }

    pub fn is_wide(self) -> bool {
        self.width() == 64
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamType::I32 => "i32",
            ParamType::F32 => "f32",
            ParamType::I64 => "i64",
            ParamType::F64 => "f64",
            ParamType::Pointer => "pointer",
        };
        f.write_str(s)
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i32" => Ok(ParamType::I32),
            "f32" => Ok(ParamType::F32),
            "i64" => Ok(ParamType::I64),
            "f64" => Ok(ParamType::F64),
            "pointer" | "ptr" => Ok(ParamType::Pointer),
            other => Err(format!("unknown parameter type `{other}`")),
        }
    }
}

/// Declared WASM type of a raw binding, result included.
pub fn declared_type(engine: &Engine, params: &[ParamType], result: Option<ParamType>) -> FuncType {
    FuncType::new(
        engine,
        params.iter().map(|p| p.val()),
        result.map(|r| r.val()),
    )
}
