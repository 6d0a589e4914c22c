// Import discovery: read a module's function imports and their declared types.

use wasmparser::{CompositeInnerType, Parser, Payload, TypeRef};
use wasmtime::ValType;

use crate::error::BindError;

/// One function import with a type the typed dispatch table can match on.
#[derive(Debug, Clone)]
pub struct FuncImport {
    pub module: String,
    pub name: String,
    pub params: Vec<ValType>,
    pub result: Option<ValType>,
}

impl FuncImport {
    pub fn new(
        module: impl Into<String>,
        name: impl Into<String>,
        params: Vec<ValType>,
        result: Option<ValType>,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            params,
            result,
        }
    }
}

fn numeric(ty: &wasmparser::ValType, module: &str, name: &str) -> Result<ValType, BindError> {
    match ty {
        wasmparser::ValType::I32 => Ok(ValType::I32),
        wasmparser::ValType::I64 => Ok(ValType::I64),
        wasmparser::ValType::F32 => Ok(ValType::F32),
        wasmparser::ValType::F64 => Ok(ValType::F64),
        other => Err(BindError::UnsupportedType {
            module: module.to_string(),
            name: name.to_string(),
            ty: other.to_string(),
        }),
    }
}

fn to_import(
    module: &str,
    name: &str,
    func: &wasmparser::FuncType,
) -> Result<FuncImport, BindError> {
    let params = func
        .params()
        .iter()
        .map(|p| numeric(p, module, name))
        .collect::<Result<Vec<_>, _>>()?;
    let result = match func.results() {
        [] => None,
        [single] => Some(numeric(single, module, name)?),
        many => {
            return Err(BindError::UnsupportedType {
                module: module.to_string(),
                name: name.to_string(),
                ty: format!("multi-value result of {} values", many.len()),
            });
        }
    };
    Ok(FuncImport::new(module, name, params, result))
}

/// Every function import in a binary module, in declaration order.
///
/// Memory, table, global and tag imports are skipped.
pub fn discover_imports(wasm: &[u8]) -> Result<Vec<FuncImport>, BindError> {
    // Indexed by type index; `None` for non-function types (GC structs and arrays).
    let mut types: Vec<Option<wasmparser::FuncType>> = Vec::new();
    let mut imports = Vec::new();

    for payload in Parser::new(0).parse_all(wasm) {
        match payload? {
            Payload::TypeSection(reader) => {
                for group in reader {
                    for sub in group?.into_types() {
                        types.push(match sub.composite_type.inner {
                            CompositeInnerType::Func(func) => Some(func),
                            _ => None,
                        });
                    }
                }
            }
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    let TypeRef::Func(index) = import.ty else {
                        continue;
                    };
                    let func = types.get(index as usize).and_then(Option::as_ref).ok_or_else(|| {
                        BindError::UnsupportedType {
                            module: import.module.to_string(),
                            name: import.name.to_string(),
                            ty: format!("type index {index}"),
                        }
                    })?;
                    imports.push(to_import(import.module, import.name, func)?);
                }
            }
            // Imports precede every section that could matter here.
            Payload::CodeSectionStart { .. } => break,
            _ => {}
        }
    }

    Ok(imports)
}

/// Function imports whose module name is `module`.
pub fn discover_module_imports(wasm: &[u8], module: &str) -> Result<Vec<FuncImport>, BindError> {
    let mut imports = discover_imports(wasm)?;
    imports.retain(|import| import.module == module);
    Ok(imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAT: &str = r#"
        (module
          (import "env" "abs" (func (param i32) (result i32)))
          (import "env" "memory" (memory 1))
          (import "env" "tick" (func))
          (import "host" "mix" (func (param f32 i64 f64) (result f64))))
    "#;

    #[test]
    fn finds_function_imports_in_order() {
        let wasm = wat::parse_str(WAT).unwrap();
        let imports = discover_imports(&wasm).unwrap();
        let names: Vec<_> = imports.iter().map(|i| format!("{}::{}", i.module, i.name)).collect();
        assert_eq!(names, ["env::abs", "env::tick", "host::mix"]);

        assert!(matches!(imports[0].params.as_slice(), [ValType::I32]));
        assert!(matches!(imports[0].result, Some(ValType::I32)));
        assert!(imports[1].params.is_empty());
        assert!(imports[1].result.is_none());
        assert!(matches!(
            imports[2].params.as_slice(),
            [ValType::F32, ValType::I64, ValType::F64]
        ));
        assert!(matches!(imports[2].result, Some(ValType::F64)));
    }

    #[test]
    fn filters_by_module() {
        let wasm = wat::parse_str(WAT).unwrap();
        let imports = discover_module_imports(&wasm, "host").unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].name, "mix");
    }

    #[test]
    fn multi_value_result_is_unsupported() {
        let wasm = wat::parse_str(
            r#"(module (import "env" "pair" (func (result i32 i32))))"#,
        )
        .unwrap();
        let err = discover_imports(&wasm).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { ref name, .. } if name == "pair"));
    }

    #[test]
    fn vector_param_is_unsupported() {
        let wasm = wat::parse_str(
            r#"(module (import "env" "splat" (func (param v128))))"#,
        )
        .unwrap();
        let err = discover_imports(&wasm).unwrap_err();
        assert!(err.to_string().contains("v128"), "{err}");
    }

    #[test]
    fn malformed_binary_is_a_wasm_error() {
        let err = discover_imports(b"\0asm\x01\0\0\0\x02\xff").unwrap_err();
        assert!(matches!(err, BindError::Wasm(_)));
    }
}
