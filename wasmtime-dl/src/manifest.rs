// Binding manifest: raw bindings declared in TOML.
//
// ```toml
// [[bind]]
// module = "env"
// name = "puts"
// symbol = "puts"
// params = ["pointer"]
// returns = "i32"
// ```

use std::path::Path;

use serde::Deserialize;

use crate::error::BindError;
use crate::param::ParamType;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindingManifest {
    #[serde(rename = "bind", default)]
    pub bindings: Vec<BindingEntry>,
}

/// One import to bind through the raw table.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingEntry {
    pub module: String,
    pub name: String,
    /// Native symbol; defaults to `name`.
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamType>,
    #[serde(default)]
    pub returns: Option<ParamType>,
}

impl BindingEntry {
    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.name)
    }
}

impl BindingManifest {
    pub fn from_toml(text: &str) -> Result<Self, BindError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, BindError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}
