// Native library handle and the single unchecked symbol-to-function-pointer cast.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use libloading::Library;

use crate::error::BindError;

/// A dynamically loaded C-ABI library.
///
/// Always handled through `Arc`: every function resolved from it holds a clone,
/// so the library stays loaded for as long as any registered callable exists.
pub struct NativeLibrary {
    lib: Library,
    label: String,
}

impl NativeLibrary {
    /// Load a shared library from `path`.
    ///
    /// # Safety
    /// Loading runs the library's initialisation routines, which may do anything.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Arc<Self>, BindError> {
        let path = path.as_ref();
        let lib = unsafe { Library::new(path) }.map_err(|e| BindError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        crate::dl_log!(crate::logging::LOG_DISPLAY, "loaded native library {}", path.display());
        Ok(Arc::new(Self {
            lib,
            label: format!("`{}`", path.display()),
        }))
    }

    /// The symbols already visible to the current process (the executable and
    /// everything it links, libc included).
    #[cfg(unix)]
    pub fn this() -> Arc<Self> {
        Arc::new(Self {
            lib: libloading::os::unix::Library::this().into(),
            label: "the current process".to_string(),
        })
    }

    /// The symbols exported by the current executable.
    #[cfg(windows)]
    pub fn this() -> Arc<Self> {
        let lib = libloading::os::windows::Library::this()
            .unwrap_or_else(|e| panic!("failed to open the current module: {e}"));
        Arc::new(Self {
            lib: lib.into(),
            label: "the current process".to_string(),
        })
    }

    /// Resolve `name` and reinterpret its address as a function pointer of type `F`.
    ///
    /// This is the only place the binding layer casts a symbol to a callable type.
    /// The returned [`NativeFn`] keeps this library alive.
    ///
    /// # Safety
    /// `F` must be an `unsafe extern "C" fn(..)` type whose parameters and return
    /// match the real symbol's calling convention exactly. A mismatch is undefined
    /// behaviour at call time and cannot be detected here.
    pub unsafe fn resolve<F: Copy>(self: &Arc<Self>, name: &str) -> Result<NativeFn<F>, BindError> {
        let symbol = unsafe { self.lib.get::<F>(name.as_bytes()) }.map_err(|e| BindError::MissingSymbol {
            symbol: name.to_string(),
            library: self.label.clone(),
            reason: e.to_string(),
        })?;
        Ok(NativeFn {
            func: *symbol,
            _lib: Arc::clone(self),
        })
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary").field("label", &self.label).finish()
    }
}

/// A resolved native function pointer plus the library it came from.
pub struct NativeFn<F> {
    func: F,
    _lib: Arc<NativeLibrary>,
}

impl<F: Copy> NativeFn<F> {
    #[inline(always)]
    pub fn get(&self) -> F {
        self.func
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn resolves_libc_symbol_from_current_process() {
        let lib = NativeLibrary::this();
        let abs = unsafe { lib.resolve::<unsafe extern "C" fn(i32) -> i32>("abs") }.unwrap();
        assert_eq!(unsafe { (abs.get())(-7) }, 7);
    }

    #[test]
    fn resolved_function_keeps_library_alive() {
        let lib = NativeLibrary::this();
        let labs = unsafe { lib.resolve::<unsafe extern "C" fn(i64) -> i64>("labs") }.unwrap();
        assert_eq!(Arc::strong_count(&lib), 2);
        drop(lib);
        assert_eq!(unsafe { (labs.get())(-9_000_000_000) }, 9_000_000_000);
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let lib = NativeLibrary::this();
        let err = unsafe { lib.resolve::<unsafe extern "C" fn()>("wasmtime_dl_no_such_symbol") }
            .err()
            .unwrap();
        assert!(matches!(err, BindError::MissingSymbol { ref symbol, .. } if symbol == "wasmtime_dl_no_such_symbol"));
        assert!(err.to_string().contains("the current process"));
    }

    #[test]
    fn open_reports_load_failure() {
        let err = unsafe { NativeLibrary::open("/nonexistent/libwasmtime_dl_missing.so") }.unwrap_err();
        assert!(matches!(err, BindError::Load { .. }));
    }
}
