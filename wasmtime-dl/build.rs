// Build script: generates the typed and raw dispatch tables into OUT_DIR.
//
// The tables are `include!`d by src/bind.rs. Generation is pure enumeration, so the
// only inputs are the failure policy env var and the codegen crate itself.

use std::env;
use std::path::PathBuf;

use wasmtime_dl_codegen::{Convention, DlConfig, OnFailure};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=WASMTIME_DL_ON_FAILURE");

    let mut config = DlConfig::default();
    config.codegen.on_failure = match env::var("WASMTIME_DL_ON_FAILURE").as_deref() {
        Ok("abort") => OnFailure::Abort,
        Ok("propagate") | Err(_) => OnFailure::Propagate,
        Ok(other) => panic!("WASMTIME_DL_ON_FAILURE must be `propagate` or `abort`, got `{other}`"),
    };

    for convention in [Convention::Typed, Convention::Raw] {
        let path = out_dir.join(format!("{convention}_dispatch.rs"));
        wasmtime_dl_codegen::run_generate(&config, convention, &path);
    }
}
