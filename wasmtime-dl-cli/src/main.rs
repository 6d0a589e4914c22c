// wasmtime-dl-cli: CLI entry point for wasmtime-dl tools (generate, signatures, verify).

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use wasmtime_dl_codegen::{Convention, DlConfig, verify};

#[derive(Parser)]
#[command(name = "wasmtime-dl", about = "wasmtime-dl: dispatch table tools for native WASM imports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the dispatch table for one convention (`typed` or `raw`).
    Generate {
        convention: Convention,
        /// Path to wasmtime-dl.config.toml.
        #[arg(long, default_value = "wasmtime-dl.config.toml")]
        config: PathBuf,
        /// Output file (default: <out_dir>/<convention>_dispatch.rs next to the config).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the table to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
        /// Skip parsing the emitted table back and checking its coverage.
        #[arg(long)]
        no_verify: bool,
    },
    /// List every supported signature of a convention, in table order.
    Signatures {
        convention: Convention,
        #[arg(long, default_value = "wasmtime-dl.config.toml")]
        config: PathBuf,
        /// Print only the number of signatures.
        #[arg(long)]
        count: bool,
    },
    /// Check a dispatch table file: one well-typed arm per supported signature.
    Verify {
        file: PathBuf,
        #[arg(long)]
        convention: Convention,
        #[arg(long, default_value = "wasmtime-dl.config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { convention, config: config_path, out, stdout, no_verify } => {
            let config = DlConfig::load(&config_path);
            if stdout {
                let opts = config.emit_options(convention);
                print!("{}", wasmtime_dl_codegen::emit(convention, &config.limits, &opts));
                return;
            }
            let out = out.unwrap_or_else(|| config.output_path(config_dir(&config_path), convention));
            if no_verify {
                let opts = config.emit_options(convention);
                if let Err(e) = wasmtime_dl_codegen::write_dispatch(convention, &config.limits, &opts, &out) {
                    eprintln!("Error: failed to write {}: {e}", out.display());
                    std::process::exit(1);
                }
                eprintln!("wasmtime-dl-codegen: wrote {} (unverified)", out.display());
            } else {
                wasmtime_dl_codegen::run_generate(&config, convention, &out);
            }
        }
        Commands::Signatures { convention, config, count } => {
            let config = DlConfig::load(&config);
            if count {
                println!("{}", wasmtime_dl_codegen::domain_size(convention, &config.limits));
                return;
            }
            let domain = wasmtime_dl_codegen::domain(convention, &config.limits);
            for (i, sig) in domain.iter().enumerate() {
                println!("{i:>5}  {sig}");
            }
            eprintln!("{} {convention} signatures", domain.len());
        }
        Commands::Verify { file, convention, config } => {
            let config = DlConfig::load(&config);
            run_verify(&file, convention, &config);
        }
    }
}

/// Directory relative outputs resolve against: the config file's parent.
fn config_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn run_verify(file: &Path, convention: Convention, config: &DlConfig) {
    let source = std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        std::process::exit(1);
    });

    let report = match verify::verify(&source, convention) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}: {e}", file.display());
            std::process::exit(1);
        }
    };

    let domain = wasmtime_dl_codegen::domain(convention, &config.limits);
    if let Err(e) = verify::check_coverage(&report, domain) {
        eprintln!("Error: {}: {e}", file.display());
        if let verify::VerifyError::Coverage { missing, extra } = &e {
            for sig in missing.iter().take(10) {
                eprintln!("  missing: {sig}");
            }
            for sig in extra.iter().take(10) {
                eprintln!("  extra:   {sig}");
            }
        }
        std::process::exit(1);
    }

    if !report.fallback {
        eprintln!("Warning: {} has no catch-all arm", file.display());
    }
    println!("OK: {} {convention} arms in {}", report.arms, file.display());
}
