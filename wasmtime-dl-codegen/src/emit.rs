// Emission Driver: enumerate, synthesize one arm per signature, wrap in a single match.

use std::path::Path;

use crate::arm::{self, ArmOptions, OnFailure};
use crate::enumerate::{self, Limits};
use crate::signature::Convention;

pub const DEFAULT_TYPED_FN: &str = "bind_typed_import";
pub const DEFAULT_RAW_FN: &str = "bind_raw_import";

/// Options for one emitted dispatch table.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Name of the generated dispatch function.
    pub fn_name: String,
    pub on_failure: OnFailure,
}

impl EmitOptions {
    pub fn typed() -> Self {
        Self {
            fn_name: DEFAULT_TYPED_FN.to_string(),
            on_failure: OnFailure::default(),
        }
    }

    pub fn raw() -> Self {
        Self {
            fn_name: DEFAULT_RAW_FN.to_string(),
            on_failure: OnFailure::default(),
        }
    }

    pub fn for_convention(convention: Convention) -> Self {
        match convention {
            Convention::Typed => Self::typed(),
            Convention::Raw => Self::raw(),
        }
    }

    fn arm_options(&self) -> ArmOptions {
        ArmOptions {
            on_failure: self.on_failure,
        }
    }
}

fn header(out: &mut String, convention: Convention, arms: usize) {
    out.push_str(&format!(
        "// Auto-generated by wasmtime-dl-codegen: {convention} convention, {arms} dispatch arms.\n"
    ));
    out.push_str("// Do not edit manually.\n\n");
}

fn fallback_arm(out: &mut String) {
    out.push_str("        _ => {\n");
    out.push_str("            return Err(BindError::UnsupportedSignature {\n");
    out.push_str("                module: module.to_string(),\n");
    out.push_str("                name: name.to_string(),\n");
    out.push_str("                signature: format!(\"{params:?} -> {result:?}\"),\n");
    out.push_str("            });\n");
    out.push_str("        }\n");
}

/// Emit the complete typed-closure dispatch table.
pub fn emit_typed(limits: &Limits, opts: &EmitOptions) -> String {
    let sigs = enumerate::typed_signatures(limits);
    let arm_opts = opts.arm_options();

    let mut out = String::with_capacity(sigs.len() * 384);
    header(&mut out, Convention::Typed, sigs.len());
    out.push_str(&format!("pub fn {}<T: 'static>(\n", opts.fn_name));
    out.push_str("    linker: &mut wasmtime::Linker<T>,\n");
    out.push_str("    lib: &std::sync::Arc<NativeLibrary>,\n");
    out.push_str("    module: &str,\n");
    out.push_str("    name: &str,\n");
    out.push_str("    symbol: &str,\n");
    out.push_str("    params: &[ValType],\n");
    out.push_str("    result: Option<&ValType>,\n");
    out.push_str(") -> Result<(), BindError> {\n");
    out.push_str("    match (params, result) {\n");
    for sig in &sigs {
        out.push_str(&arm::typed_arm(sig, &arm_opts));
    }
    fallback_arm(&mut out);
    out.push_str("    }\n");
    out.push_str("    Ok(())\n");
    out.push_str("}\n");
    out
}

/// Emit the complete raw stack-slot dispatch table.
pub fn emit_raw(limits: &Limits, opts: &EmitOptions) -> String {
    let sigs = enumerate::raw_signatures(limits);
    let arm_opts = opts.arm_options();

    let mut out = String::with_capacity(sigs.len() * 768);
    header(&mut out, Convention::Raw, sigs.len());
    out.push_str(&format!("pub fn {}<T: 'static>(\n", opts.fn_name));
    out.push_str("    linker: &mut wasmtime::Linker<T>,\n");
    out.push_str("    lib: &std::sync::Arc<NativeLibrary>,\n");
    out.push_str("    module: &str,\n");
    out.push_str("    name: &str,\n");
    out.push_str("    symbol: &str,\n");
    out.push_str("    ty: wasmtime::FuncType,\n");
    out.push_str("    params: &[ParamType],\n");
    out.push_str("    result: Option<ParamType>,\n");
    out.push_str(") -> Result<(), BindError> {\n");
    out.push_str("    match (params, result) {\n");
    for sig in &sigs {
        out.push_str(&arm::raw_arm(sig, &arm_opts));
    }
    fallback_arm(&mut out);
    out.push_str("    }\n");
    out.push_str("    Ok(())\n");
    out.push_str("}\n");
    out
}

pub fn emit(convention: Convention, limits: &Limits, opts: &EmitOptions) -> String {
    match convention {
        Convention::Typed => emit_typed(limits, opts),
        Convention::Raw => emit_raw(limits, opts),
    }
}

/// Emit a dispatch table and write it to `path`.
pub fn write_dispatch(
    convention: Convention,
    limits: &Limits,
    opts: &EmitOptions,
    path: &Path,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, emit(convention, limits, opts))
}
