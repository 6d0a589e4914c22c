// wasmtime-dl: binds WASM imports to symbols of a dynamically loaded C-ABI library.
// Every supported signature has one generated dispatch arm (see build.rs); the
// arm resolves the symbol at its exact native type and registers a shim with
// the wasmtime Linker.

pub mod error;
pub mod logging;
pub mod library;
pub mod param;
pub mod raw;
pub mod imports;
pub mod manifest;
pub mod bind;

pub use bind::Binder;
pub use error::{BindError, bind_or_abort};
pub use imports::{FuncImport, discover_imports, discover_module_imports};
pub use library::{NativeFn, NativeLibrary};
pub use logging::{LOG_DISPLAY, LOG_ERROR, LOG_WARNING, set_log_sink, stderr_sink};
pub use manifest::{BindingEntry, BindingManifest};
pub use param::{ParamType, declared_type};
