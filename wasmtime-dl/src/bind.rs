// Public binding API over the generated dispatch tables.

use std::collections::HashMap;
use std::sync::Arc;

use wasmtime::{Linker, ValType};

use crate::dl_log;
use crate::error::BindError;
use crate::imports::{self, FuncImport};
use crate::library::NativeLibrary;
use crate::logging::{LOG_DISPLAY, LOG_ERROR};
use crate::manifest::BindingManifest;
use crate::param::{self, ParamType};

#[allow(unused_imports, unused_variables, unused_unsafe, unreachable_code, clippy::all)]
mod typed_dispatch {
    use crate::error::BindError;
    use crate::library::NativeLibrary;
    use wasmtime::ValType;

    include!(concat!(env!("OUT_DIR"), "/typed_dispatch.rs"));
}

#[allow(unused_imports, unused_variables, unused_unsafe, unreachable_code, clippy::all)]
mod raw_dispatch {
    use crate::error::BindError;
    use crate::library::NativeLibrary;
    use crate::param::ParamType;
    use crate::raw::{load_w32, load_w64, store_f32, store_f64, store_i32, store_i64};

    include!(concat!(env!("OUT_DIR"), "/raw_dispatch.rs"));
}

fn logged(result: Result<(), BindError>, module: &str, name: &str, symbol: &str) -> Result<(), BindError> {
    match &result {
        Ok(()) => dl_log!(LOG_DISPLAY, "bound {module}::{name} -> {symbol}"),
        Err(err) => dl_log!(LOG_ERROR, "{err}"),
    }
    result
}

/// Binds WASM imports to symbols of one native library.
#[derive(Debug, Clone)]
pub struct Binder {
    lib: Arc<NativeLibrary>,
}

impl Binder {
    pub fn new(lib: Arc<NativeLibrary>) -> Self {
        Self { lib }
    }

    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.lib
    }

    /// Bind `import` to the native symbol of the same name through the typed table.
    pub fn bind_typed<T: 'static>(
        &self,
        linker: &mut Linker<T>,
        import: &FuncImport,
    ) -> Result<(), BindError> {
        self.bind_typed_as(linker, import, &import.name)
    }

    /// Bind `import` to `symbol` through the typed table.
    pub fn bind_typed_as<T: 'static>(
        &self,
        linker: &mut Linker<T>,
        import: &FuncImport,
        symbol: &str,
    ) -> Result<(), BindError> {
        let result = typed_dispatch::bind_typed_import(
            linker,
            &self.lib,
            &import.module,
            &import.name,
            symbol,
            &import.params,
            import.result.as_ref(),
        );
        logged(result, &import.module, &import.name, symbol)
    }

    /// Bind `module::name` to `symbol` through the raw table.
    ///
    /// The declared import type is built from `params` and `result`; a module
    /// importing the name under any other type fails to instantiate.
    pub fn bind_raw<T: 'static>(
        &self,
        linker: &mut Linker<T>,
        module: &str,
        name: &str,
        symbol: &str,
        params: &[ParamType],
        result: Option<ParamType>,
    ) -> Result<(), BindError> {
        let ty = param::declared_type(linker.engine(), params, result);
        let bound = raw_dispatch::bind_raw_import(linker, &self.lib, module, name, symbol, ty, params, result);
        logged(bound, module, name, symbol)
    }

    /// Bind every function import of `wasm` whose module is `import_module`.
    ///
    /// All or nothing: on failure `linker` is left unchanged. An import the
    /// module declares more than once is bound once. Returns the number of
    /// distinct imports bound.
    pub fn bind_module<T: 'static>(
        &self,
        linker: &mut Linker<T>,
        wasm: &[u8],
        import_module: &str,
    ) -> Result<usize, BindError> {
        let imports = distinct_imports(imports::discover_module_imports(wasm, import_module)?)?;
        let mut staged = linker.clone();
        for import in &imports {
            self.bind_typed(&mut staged, import)?;
        }
        *linker = staged;
        dl_log!(LOG_DISPLAY, "bound {} imports from `{import_module}`", imports.len());
        Ok(imports.len())
    }

    /// Bind every manifest entry through the raw table. Returns the number bound.
    ///
    /// All or nothing, as with [`Binder::bind_module`].
    pub fn bind_manifest<T: 'static>(
        &self,
        linker: &mut Linker<T>,
        manifest: &BindingManifest,
    ) -> Result<usize, BindError> {
        let mut staged = linker.clone();
        for entry in &manifest.bindings {
            self.bind_raw(
                &mut staged,
                &entry.module,
                &entry.name,
                entry.symbol(),
                &entry.params,
                entry.returns,
            )?;
        }
        *linker = staged;
        Ok(manifest.bindings.len())
    }
}

fn same_type(a: &FuncImport, b: &FuncImport) -> bool {
    a.params.len() == b.params.len()
        && a.params.iter().zip(&b.params).all(|(x, y)| ValType::eq(x, y))
        && match (&a.result, &b.result) {
            (Some(x), Some(y)) => ValType::eq(x, y),
            (None, None) => true,
            _ => false,
        }
}

/// Collapse repeated `(module, name)` imports. Repeats must agree on the type.
fn distinct_imports(imports: Vec<FuncImport>) -> Result<Vec<FuncImport>, BindError> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut distinct: Vec<FuncImport> = Vec::with_capacity(imports.len());
    for import in imports {
        let key = (import.module.clone(), import.name.clone());
        match index.get(&key) {
            Some(&seen) if same_type(&distinct[seen], &import) => {}
            Some(_) => {
                return Err(BindError::UnsupportedType {
                    module: import.module,
                    name: import.name,
                    ty: "conflicting types across repeated imports".to_string(),
                });
            }
            None => {
                index.insert(key, distinct.len());
                distinct.push(import);
            }
        }
    }
    Ok(distinct)
}
