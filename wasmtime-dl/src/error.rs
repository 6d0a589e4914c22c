// Error types for the binding layer.

use thiserror::Error;

/// Everything that can go wrong while building an import table.
///
/// All of these are binding-configuration defects surfaced at bind time;
/// nothing here is produced per call.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("failed to load native library `{path}`: {reason}")]
    Load { path: String, reason: String },
    #[error("symbol `{symbol}` not found in {library}: {reason}")]
    MissingSymbol {
        symbol: String,
        library: String,
        reason: String,
    },
    #[error("failed to register `{module}::{name}`: {reason}")]
    Registration {
        module: String,
        name: String,
        reason: String,
    },
    #[error("no dispatch arm for `{module}::{name}` with signature {signature}")]
    UnsupportedSignature {
        module: String,
        name: String,
        signature: String,
    },
    #[error("import `{module}::{name}` uses unsupported type {ty}")]
    UnsupportedType {
        module: String,
        name: String,
        ty: String,
    },
    #[error("wasm binary error: {0}")]
    Wasm(#[from] wasmparser::BinaryReaderError),
    #[error("invalid binding manifest: {0}")]
    Manifest(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    /// Wrap a linker rejection (typically a duplicate `(module, name)`).
    pub fn registration(module: &str, name: &str, err: wasmtime::Error) -> Self {
        BindError::Registration {
            module: module.to_string(),
            name: name.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

/// Unwrap a binding result, aborting on failure.
///
/// For embedders that treat a missing symbol or duplicate import as fatal
/// rather than handling the error.
pub fn bind_or_abort<T>(result: Result<T, BindError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            crate::dl_log!(crate::logging::LOG_ERROR, "fatal binding error: {err}");
            panic!("fatal binding error: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_are_human_readable() {
        let err = BindError::UnsupportedSignature {
            module: "env".into(),
            name: "mix".into(),
            signature: "[I32, V128] -> None".into(),
        };
        assert_eq!(
            err.to_string(),
            "no dispatch arm for `env::mix` with signature [I32, V128] -> None"
        );
    }

    #[test]
    fn registration_keeps_linker_message() {
        let err = BindError::registration("env", "abs", wasmtime::Error::msg("already defined"));
        assert_eq!(err.to_string(), "failed to register `env::abs`: already defined");
    }

    #[test]
    fn bind_or_abort_passes_values_through() {
        assert_eq!(bind_or_abort(Ok::<_, BindError>(3)), 3);
    }

    #[test]
    #[should_panic(expected = "fatal binding error")]
    fn bind_or_abort_panics_on_error() {
        bind_or_abort::<()>(Err(BindError::Load {
            path: "libmissing.so".into(),
            reason: "not found".into(),
        }));
    }
}
