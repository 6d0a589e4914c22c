// Configuration for wasmtime-dl-codegen, deserialized from wasmtime-dl.config.toml.

use std::path::Path;

use serde::Deserialize;

use crate::arm::OnFailure;
use crate::emit::{DEFAULT_RAW_FN, DEFAULT_TYPED_FN, EmitOptions};
use crate::enumerate::Limits;
use crate::signature::Convention;

/// Top-level config file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct DlConfig {
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Directory the CLI writes `<convention>_dispatch.rs` into when `--out` is not given.
    pub out_dir: String,
    pub on_failure: OnFailure,
    /// Name of the generated typed dispatch function.
    pub typed_fn: String,
    /// Name of the generated raw dispatch function.
    pub raw_fn: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            out_dir: "generated".to_string(),
            on_failure: OnFailure::Propagate,
            typed_fn: DEFAULT_TYPED_FN.to_string(),
            raw_fn: DEFAULT_RAW_FN.to_string(),
        }
    }
}

impl DlConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => panic!("Failed to read {}: {e}", path.display()),
        }
    }

    pub fn emit_options(&self, convention: Convention) -> EmitOptions {
        let fn_name = match convention {
            Convention::Typed => &self.codegen.typed_fn,
            Convention::Raw => &self.codegen.raw_fn,
        };
        EmitOptions {
            fn_name: fn_name.clone(),
            on_failure: self.codegen.on_failure,
        }
    }

    /// Default output file for a convention: `<out_dir>/<convention>_dispatch.rs`.
    pub fn output_path(&self, base: &Path, convention: Convention) -> std::path::PathBuf {
        base.join(&self.codegen.out_dir)
            .join(format!("{convention}_dispatch.rs"))
    }
}
