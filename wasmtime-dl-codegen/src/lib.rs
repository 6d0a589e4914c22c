// wasmtime-dl-codegen: enumerates supported native signatures and emits one
// dispatch arm per signature, for the typed-closure and raw stack-slot conventions.

pub mod signature;
pub mod enumerate;
pub mod type_map;
pub mod arm;
pub mod emit;
pub mod verify;
pub mod config;

use std::path::Path;

pub use crate::arm::OnFailure;
pub use crate::config::DlConfig;
pub use crate::emit::{EmitOptions, emit, emit_raw, emit_typed, write_dispatch};
pub use crate::enumerate::Limits;
pub use crate::signature::{Convention, RawSignature, TypedSignature, ValueType, Width};

/// Enumerated domain of a convention, as display strings.
pub fn domain(convention: Convention, limits: &Limits) -> Vec<String> {
    match convention {
        Convention::Typed => enumerate::typed_signatures(limits)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        Convention::Raw => enumerate::raw_signatures(limits)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Closed-form domain size of a convention.
pub fn domain_size(convention: Convention, limits: &Limits) -> usize {
    match convention {
        Convention::Typed => enumerate::typed_domain_size(limits),
        Convention::Raw => enumerate::raw_domain_size(limits),
    }
}

/// Generate, write and verify the dispatch table for one convention.
///
/// Main entry point for build scripts and the CLI. Panics on I/O failure or if
/// the emitted table does not verify against the enumerated domain.
pub fn run_generate(config: &DlConfig, convention: Convention, out_path: &Path) {
    let opts = config.emit_options(convention);
    let limits = &config.limits;

    eprintln!("wasmtime-dl-codegen: generating {convention} dispatch table...");
    let source = emit(convention, limits, &opts);

    eprintln!("wasmtime-dl-codegen: verifying output...");
    let report = verify::verify(&source, convention)
        .unwrap_or_else(|e| panic!("Generated {convention} table failed verification: {e}"));
    verify::check_coverage(&report, domain(convention, limits))
        .unwrap_or_else(|e| panic!("Generated {convention} table failed coverage: {e}"));
    assert_eq!(
        report.arms,
        domain_size(convention, limits),
        "arm count disagrees with the closed-form domain size"
    );

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
    }
    std::fs::write(out_path, &source)
        .unwrap_or_else(|e| panic!("Failed to write {}: {e}", out_path.display()));

    eprintln!(
        "  OK: {} arms ({} bytes) -> {}",
        report.arms,
        source.len(),
        out_path.display()
    );
}
