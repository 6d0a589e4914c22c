// Dispatch-Arm Synthesizer: one match arm of source text per signature.
//
// Every arm follows the same four steps:
// 1. pattern over (params, result) for exactly one signature
// 2. `lib.resolve::<FNPTR>(symbol)`, the only unchecked reinterpretation
// 3. a shim forwarding call-time values to the resolved pointer
// 4. registration of the shim under (module, name)
//
// Arms refer to the enclosing function's parameters by fixed names:
// `linker`, `lib`, `module`, `name`, `symbol` and (raw only) `ty`.

use serde::Deserialize;

use crate::signature::{RawSignature, TypedSignature};
use crate::type_map;

/// How an arm reacts to a missing symbol or a rejected registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Return `Err(BindError)` from the dispatch function.
    #[default]
    Propagate,
    /// Panic at binding time. Nothing is partially registered past the failing import.
    Abort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArmOptions {
    pub on_failure: OnFailure,
}

const INDENT: &str = "        ";

/// `let func = unsafe { lib.resolve::<FNPTR>(symbol)? };`
fn resolve_stmt(fn_type: &str, on_failure: OnFailure) -> String {
    match on_failure {
        OnFailure::Propagate => format!(
            "{INDENT}    let func = unsafe {{ lib.resolve::<{fn_type}>(symbol)? }};\n"
        ),
        OnFailure::Abort => format!(
            "{INDENT}    let func = unsafe {{ lib.resolve::<{fn_type}>(symbol) }}\n\
             {INDENT}        .unwrap_or_else(|err| panic!(\"{{err}}\"));\n"
        ),
    }
}

/// Tail applied to the registration expression.
fn registration_tail(on_failure: OnFailure) -> &'static str {
    match on_failure {
        OnFailure::Propagate => ".map_err(|err| BindError::registration(module, name, err))?;",
        OnFailure::Abort => {
            ".unwrap_or_else(|err| panic!(\"failed to register `{module}::{name}`: {err}\"));"
        }
    }
}

// ---------------------------------------------------------------------------
// Typed convention
// ---------------------------------------------------------------------------

/// Synthesize the arm for one typed-closure signature.
///
/// The shim takes positional values of exactly the matched kinds and forwards
/// them unchanged; `func_wrap` guarantees the caller supplies those kinds.
pub fn typed_arm(sig: &TypedSignature, opts: &ArmOptions) -> String {
    let param_patterns: Vec<String> = sig.params.iter().map(|p| type_map::typed_pattern(*p)).collect();
    let natives: Vec<&str> = sig.params.iter().map(|p| type_map::typed_native(*p)).collect();
    let result_native = sig.result.map(type_map::typed_native);
    let fn_type = type_map::native_fn_type(&natives, result_native);

    let names: Vec<String> = (0..sig.arity()).map(type_map::param_name).collect();
    let closure_params: Vec<String> = names
        .iter()
        .zip(&natives)
        .map(|(n, t)| format!("{n}: {t}"))
        .collect();
    let ret = result_native.map(|r| format!(" -> {r}")).unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("{INDENT}// {sig}\n"));
    out.push_str(&format!(
        "{INDENT}([{}], {}) => {{\n",
        param_patterns.join(", "),
        type_map::typed_result_pattern(sig.result)
    ));
    out.push_str(&resolve_stmt(&fn_type, opts.on_failure));
    out.push_str(&format!("{INDENT}    linker\n"));
    out.push_str(&format!(
        "{INDENT}        .func_wrap(module, name, move |{}|{ret} {{ unsafe {{ (func.get())({}) }} }})\n",
        closure_params.join(", "),
        names.join(", ")
    ));
    out.push_str(&format!("{INDENT}        {}\n", registration_tail(opts.on_failure)));
    out.push_str(&format!("{INDENT}}}\n"));
    out
}

// ---------------------------------------------------------------------------
// Raw convention
// ---------------------------------------------------------------------------

/// Synthesize the arm for one raw stack-slot signature.
///
/// Parameter patterns match any kind of the slot's width and bind the matched
/// kind; the shim uses it to read the slot, then calls through the integer
/// carrier of that width. A result is written back into slot 0.
///
/// Only parameters collapse to their width; the native return type keeps the
/// exact kind, since a float comes back in a float register.
pub fn raw_arm(sig: &RawSignature, opts: &ArmOptions) -> String {
    let param_patterns: Vec<String> = sig
        .params
        .iter()
        .enumerate()
        .map(|(i, w)| type_map::raw_param_pattern(i, *w))
        .collect();
    let natives: Vec<&str> = sig.params.iter().map(|w| type_map::raw_native(*w)).collect();
    let result_native = sig.result.map(|r| r.native());
    let fn_type = type_map::native_fn_type(&natives, result_native);

    let args: Vec<String> = (0..sig.arity()).map(type_map::arg_name).collect();
    let slots = if sig.arity() == 0 && sig.result.is_none() { "_args" } else { "args" };

    let mut out = String::new();
    out.push_str(&format!("{INDENT}// {sig}\n"));
    out.push_str(&format!(
        "{INDENT}([{}], {}) => {{\n",
        param_patterns.join(", "),
        type_map::raw_result_pattern(sig.result)
    ));
    for i in 0..sig.arity() {
        let p = type_map::param_name(i);
        out.push_str(&format!("{INDENT}    let {p} = *{p};\n"));
    }
    out.push_str(&resolve_stmt(&fn_type, opts.on_failure));
    out.push_str(&format!("{INDENT}    let registered = unsafe {{\n"));
    out.push_str(&format!(
        "{INDENT}        linker.func_new_unchecked(module, name, ty, move |_caller, {slots}| {{\n"
    ));
    for (i, w) in sig.params.iter().enumerate() {
        out.push_str(&format!(
            "{INDENT}            let {} = {}({slots}[{i}], {});\n",
            args[i],
            type_map::raw_loader(*w),
            type_map::param_name(i)
        ));
    }
    let call = format!("unsafe {{ (func.get())({}) }}", args.join(", "));
    match sig.result {
        Some(r) => {
            out.push_str(&format!("{INDENT}            let ret = {call};\n"));
            out.push_str(&format!(
                "{INDENT}            {}({slots}, ret);\n",
                type_map::raw_storer(r)
            ));
        }
        None => out.push_str(&format!("{INDENT}            {call};\n")),
    }
    out.push_str(&format!("{INDENT}            Ok(())\n"));
    out.push_str(&format!("{INDENT}        }})\n"));
    out.push_str(&format!("{INDENT}    }};\n"));
    out.push_str(&format!(
        "{INDENT}    registered{}\n",
        registration_tail(opts.on_failure)
    ));
    out.push_str(&format!("{INDENT}}}\n"));
    out
}
