// Per-convention mapping from signature slots to pattern text and native type text.
//
// Pattern text and native text for an arm are both derived from the same
// signature through the functions below, so an arm's declared function-pointer
// type cannot disagree with its match pattern.

use crate::signature::{ValueType, Width};

/// Enum path the typed table matches against (`wasmtime::ValType`).
pub const TYPED_ENUM: &str = "ValType";
/// Enum path the raw table matches against (`wasmtime_dl::ParamType`).
pub const RAW_ENUM: &str = "ParamType";

/// Local name of positional parameter `i` (closure argument or bound kind).
pub fn param_name(i: usize) -> String {
    format!("p{i}")
}

/// Local name of the marshalled native argument `i` in a raw shim.
pub fn arg_name(i: usize) -> String {
    format!("a{i}")
}

// ---------------------------------------------------------------------------
// Typed convention
// ---------------------------------------------------------------------------

/// `ValType::F64`
pub fn typed_pattern(ty: ValueType) -> String {
    format!("{TYPED_ENUM}::{}", ty.variant())
}

/// `None` / `Some(ValType::F32)`
pub fn typed_result_pattern(result: Option<ValueType>) -> String {
    match result {
        Some(ty) => format!("Some({})", typed_pattern(ty)),
        None => "None".to_string(),
    }
}

/// Native parameter type: the kind's own name.
pub fn typed_native(ty: ValueType) -> &'static str {
    ty.native()
}

// ---------------------------------------------------------------------------
// Raw convention
// ---------------------------------------------------------------------------

/// `ParamType::I32 | ParamType::F32 | ParamType::Pointer`
pub fn raw_width_alternatives(width: Width) -> String {
    width
        .kinds()
        .iter()
        .map(|k| format!("{RAW_ENUM}::{}", k.variant()))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `p0 @ (ParamType::I64 | ParamType::F64)`: binds the matched kind for marshalling.
pub fn raw_param_pattern(i: usize, width: Width) -> String {
    format!("{} @ ({})", param_name(i), raw_width_alternatives(width))
}

/// Import kinds a raw return slot of this kind matches: `i32` also accepts a pointer.
pub fn raw_result_kinds(ty: ValueType) -> &'static [ValueType] {
    match ty {
        ValueType::I32 | ValueType::Pointer => &[ValueType::I32, ValueType::Pointer],
        ValueType::F32 => &[ValueType::F32],
        ValueType::I64 => &[ValueType::I64],
        ValueType::F64 => &[ValueType::F64],
    }
}

/// `None` / `Some(ParamType::I32 | ParamType::Pointer)` / `Some(ParamType::F64)`
pub fn raw_result_pattern(result: Option<ValueType>) -> String {
    match result {
        Some(ty) => {
            let alts = raw_result_kinds(ty)
                .iter()
                .map(|k| format!("{RAW_ENUM}::{}", k.variant()))
                .collect::<Vec<_>>()
                .join(" | ");
            format!("Some({alts})")
        }
        None => "None".to_string(),
    }
}

/// Native parameter type: always the integer carrier of the width.
pub fn raw_native(width: Width) -> &'static str {
    width.native()
}

/// Raw-slot loader used to extract a parameter of this width.
pub fn raw_loader(width: Width) -> &'static str {
    match width {
        Width::W32 => "load_w32",
        Width::W64 => "load_w64",
    }
}

/// Raw-slot writer used to hand a native result back to the caller.
pub fn raw_storer(ty: ValueType) -> &'static str {
    match ty {
        ValueType::I32 | ValueType::Pointer => "store_i32",
        ValueType::F32 => "store_f32",
        ValueType::I64 => "store_i64",
        ValueType::F64 => "store_f64",
    }
}

// ---------------------------------------------------------------------------
// Native function-pointer type
// ---------------------------------------------------------------------------

/// `unsafe extern "C" fn(i32, f64) -> f32`
pub fn native_fn_type(params: &[&str], result: Option<&str>) -> String {
    let ret = match result {
        Some(r) => format!(" -> {r}"),
        None => String::new(),
    };
    format!("unsafe extern \"C\" fn({}){ret}", params.join(", "))
}
