// Post-generation verification: parse an emitted dispatch table back with syn and
// check that every arm's declared native type agrees with its match pattern, that
// no pattern is repeated, and (via `check_coverage`) that the arms cover the
// enumerated domain exactly.

use std::collections::{BTreeSet, HashSet};

use syn::visit::{self, Visit};
use syn::{Expr, ExprMatch, ExprMethodCall, GenericArgument, Item, Pat, ReturnType, Stmt, Type, TypeBareFn};
use thiserror::Error;

use crate::signature::{Convention, RawSignature, TypedSignature, ValueType, Width};
use crate::type_map;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("failed to parse generated source: {0}")]
    Parse(#[from] syn::Error),
    #[error("no dispatch function found")]
    MissingFunction,
    #[error("dispatch function has no match over (params, result)")]
    MissingMatch,
    #[error("arm {index}: unrecognised pattern ({reason})")]
    Pattern { index: usize, reason: String },
    #[error("arm {index} {signature}: no `resolve::<unsafe extern \"C\" fn(..)>` call")]
    MissingResolve { index: usize, signature: String },
    #[error("arm {index} {signature}: no `{registration}` call")]
    MissingRegistration {
        index: usize,
        signature: String,
        registration: &'static str,
    },
    #[error("arm {index} {signature}: declared native type {declared} but pattern implies {expected}")]
    TypeMismatch {
        index: usize,
        signature: String,
        declared: String,
        expected: String,
    },
    #[error("arm {index}: pattern {signature} already matched by an earlier arm")]
    Duplicate { index: usize, signature: String },
    #[error("coverage mismatch: {} signatures missing, {} outside the domain", .missing.len(), .extra.len())]
    Coverage { missing: Vec<String>, extra: Vec<String> },
}

/// Summary of a verified dispatch table.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub convention: Convention,
    /// Dispatch arms (the catch-all is not counted).
    pub arms: usize,
    /// Whether a trailing catch-all arm exists.
    pub fallback: bool,
    /// Signature of every arm, in table order.
    pub signatures: Vec<String>,
}

/// Parse and check a generated dispatch table.
pub fn verify(source: &str, convention: Convention) -> Result<VerifyReport, VerifyError> {
    let file = syn::parse_file(source)?;
    let func = file
        .items
        .iter()
        .find_map(|item| match item {
            Item::Fn(f) => Some(f),
            _ => None,
        })
        .ok_or(VerifyError::MissingFunction)?;

    let dispatch = func
        .block
        .stmts
        .iter()
        .find_map(|stmt| match stmt {
            Stmt::Expr(Expr::Match(m), _) => Some(m),
            _ => None,
        })
        .ok_or(VerifyError::MissingMatch)?;

    check_arms(dispatch, convention)
}

fn check_arms(dispatch: &ExprMatch, convention: Convention) -> Result<VerifyReport, VerifyError> {
    let mut seen = HashSet::new();
    let mut signatures = Vec::with_capacity(dispatch.arms.len());
    let mut fallback = false;

    for (index, arm) in dispatch.arms.iter().enumerate() {
        if matches!(arm.pat, Pat::Wild(_)) {
            fallback = true;
            continue;
        }

        let (params, result) = split_arm_pattern(&arm.pat).map_err(|reason| VerifyError::Pattern { index, reason })?;
        let shape = match convention {
            Convention::Typed => typed_shape(params, result),
            Convention::Raw => raw_shape(params, result),
        }
        .map_err(|reason| VerifyError::Pattern { index, reason })?;

        let mut calls = ArmCalls::default();
        calls.visit_expr(&arm.body);

        let registration = match convention {
            Convention::Typed => "func_wrap",
            Convention::Raw => "func_new_unchecked",
        };
        if !calls.methods.contains(registration) {
            return Err(VerifyError::MissingRegistration {
                index,
                signature: shape.signature,
                registration,
            });
        }
        let declared = match calls.resolved.as_slice() {
            [one] => bare_fn_shape(one),
            _ => None,
        }
        .ok_or_else(|| VerifyError::MissingResolve {
            index,
            signature: shape.signature.clone(),
        })?;

        if declared != shape.native {
            return Err(VerifyError::TypeMismatch {
                index,
                signature: shape.signature,
                declared,
                expected: shape.native,
            });
        }
        if !seen.insert(shape.signature.clone()) {
            return Err(VerifyError::Duplicate {
                index,
                signature: shape.signature,
            });
        }
        signatures.push(shape.signature);
    }

    Ok(VerifyReport {
        convention,
        arms: signatures.len(),
        fallback,
        signatures,
    })
}

/// Check that a report's arms match `domain` exactly, ignoring order.
pub fn check_coverage<I>(report: &VerifyReport, domain: I) -> Result<(), VerifyError>
where
    I: IntoIterator<Item = String>,
{
    let expected: BTreeSet<String> = domain.into_iter().collect();
    let actual: BTreeSet<String> = report.signatures.iter().cloned().collect();
    let missing: Vec<String> = expected.difference(&actual).cloned().collect();
    let extra: Vec<String> = actual.difference(&expected).cloned().collect();
    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::Coverage { missing, extra })
    }
}

// ---------------------------------------------------------------------------
// Pattern side
// ---------------------------------------------------------------------------

/// Recovered arm shape: its signature (display form) and the native type it implies.
struct ArmShape {
    signature: String,
    native: String,
}

fn split_arm_pattern(pat: &Pat) -> Result<(Vec<Vec<ValueType>>, Option<Vec<ValueType>>), String> {
    let Pat::Tuple(tuple) = pat else {
        return Err("expected a (params, result) tuple".to_string());
    };
    let elems: Vec<&Pat> = tuple.elems.iter().collect();
    let [params, result] = elems.as_slice() else {
        return Err(format!("expected 2 tuple elements, found {}", elems.len()));
    };
    let Pat::Slice(slice) = params else {
        return Err("parameter pattern is not a slice".to_string());
    };
    let params = slice.elems.iter().map(kinds_of).collect::<Result<Vec<_>, _>>()?;

    let result = match result {
        Pat::Ident(id) if id.ident == "None" => None,
        Pat::TupleStruct(ts) if ts.path.is_ident("Some") && ts.elems.len() == 1 => Some(kinds_of(&ts.elems[0])?),
        _ => return Err("result pattern is neither `None` nor `Some(..)`".to_string()),
    };
    Ok((params, result))
}

/// Kinds a single slot pattern accepts: `ValType::I32`, `A | B`, `pN @ (A | B)`.
fn kinds_of(pat: &Pat) -> Result<Vec<ValueType>, String> {
    match pat {
        Pat::Path(p) => {
            let seg = p.path.segments.last().ok_or("empty path")?;
            let name = seg.ident.to_string();
            ValueType::from_variant(&name)
                .map(|k| vec![k])
                .ok_or_else(|| format!("unknown kind `{name}`"))
        }
        Pat::Or(or) => {
            let mut kinds = Vec::new();
            for case in &or.cases {
                kinds.extend(kinds_of(case)?);
            }
            Ok(kinds)
        }
        Pat::Paren(p) => kinds_of(&p.pat),
        Pat::Ident(id) => match &id.subpat {
            Some((_, sub)) => kinds_of(sub),
            None => Err(format!("unbound identifier `{}` in slot", id.ident)),
        },
        _ => Err("unsupported slot pattern".to_string()),
    }
}

fn sorted(mut kinds: Vec<ValueType>) -> Vec<ValueType> {
    kinds.sort();
    kinds.dedup();
    kinds
}

fn single(kinds: Vec<ValueType>) -> Result<ValueType, String> {
    match kinds.as_slice() {
        [k] if *k != ValueType::Pointer => Ok(*k),
        _ => Err(format!("typed slot must match exactly one numeric kind, found {kinds:?}")),
    }
}

fn native_shape(params: &[&str], result: Option<&str>) -> String {
    format!("({}) -> {}", params.join(", "), result.unwrap_or("()"))
}

fn typed_shape(params: Vec<Vec<ValueType>>, result: Option<Vec<ValueType>>) -> Result<ArmShape, String> {
    let params = params.into_iter().map(single).collect::<Result<Vec<_>, _>>()?;
    let result = result.map(single).transpose()?;
    let natives: Vec<&str> = params.iter().map(|p| type_map::typed_native(*p)).collect();
    let native = native_shape(&natives, result.map(type_map::typed_native));
    Ok(ArmShape {
        signature: TypedSignature::new(params, result).to_string(),
        native,
    })
}

fn raw_shape(params: Vec<Vec<ValueType>>, result: Option<Vec<ValueType>>) -> Result<ArmShape, String> {
    let widths = params
        .into_iter()
        .map(|kinds| {
            let kinds = sorted(kinds);
            Width::ALL
                .into_iter()
                .find(|w| sorted(w.kinds().to_vec()) == kinds)
                .ok_or_else(|| format!("slot kinds {kinds:?} are not a full width class"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let result = result
        .map(|kinds| {
            let kinds = sorted(kinds);
            ValueType::NUMERIC
                .into_iter()
                .find(|ty| sorted(type_map::raw_result_kinds(*ty).to_vec()) == kinds)
                .ok_or_else(|| format!("result kinds {kinds:?} do not form a raw return class"))
        })
        .transpose()?;
    let natives: Vec<&str> = widths.iter().map(|w| type_map::raw_native(*w)).collect();
    let native = native_shape(&natives, result.map(|r| r.native()));
    Ok(ArmShape {
        signature: RawSignature::new(widths, result).to_string(),
        native,
    })
}

// ---------------------------------------------------------------------------
// Body side
// ---------------------------------------------------------------------------

/// Method calls found in one arm body.
#[derive(Default)]
struct ArmCalls {
    methods: HashSet<&'static str>,
    resolved: Vec<TypeBareFn>,
}

impl<'ast> Visit<'ast> for ArmCalls {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if call.method == "resolve" {
            if let Some(turbofish) = &call.turbofish {
                for arg in &turbofish.args {
                    if let GenericArgument::Type(Type::BareFn(f)) = arg {
                        self.resolved.push(f.clone());
                    }
                }
            }
        } else if call.method == "func_wrap" {
            self.methods.insert("func_wrap");
        } else if call.method == "func_new_unchecked" {
            self.methods.insert("func_new_unchecked");
        }
        visit::visit_expr_method_call(self, call);
    }
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(p) => p.path.get_ident().map(|i| i.to_string()),
        _ => None,
    }
}

/// `unsafe extern "C" fn(i32, f64) -> f32` becomes `(i32, f64) -> f32`.
fn bare_fn_shape(f: &TypeBareFn) -> Option<String> {
    f.unsafety?;
    let abi = f.abi.as_ref()?.name.as_ref()?.value();
    if abi != "C" {
        return None;
    }
    let params = f
        .inputs
        .iter()
        .map(|arg| type_name(&arg.ty))
        .collect::<Option<Vec<_>>>()?;
    let result = match &f.output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => Some(type_name(ty)?),
    };
    let params: Vec<&str> = params.iter().map(String::as_str).collect();
    Some(native_shape(&params, result.as_deref()))
}
