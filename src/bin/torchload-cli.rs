//! `torchload-cli`: fetch and unpack a prebuilt libtorch distribution
//! ==================================================================
//!
//! ```text
//! torchload-cli [--os <os>] [--cuv <toolkit>] [--cuda] [--build <flavor>]
//!               [--version <release>] [--targetdir <dir>] [--force]
//! ```
//!
//! | Flag | Default | Meaning |
//! |------|---------|---------|
//! | `--os` | host OS | `linux`, `macos`, `windows`, or an alias (`ubuntu`, `darwin`, `win10`, …). |
//! | `--cuv` | `cpu` | CUDA toolkit version (`11.8`, `118`, `cu118`); also spelled `--cuda_version`. |
//! | `--cuda` | off | Fail instead of silently falling back to a cpu archive. |
//! | `--build` | `debug` | `debug` or `release`; only Windows publishes both. |
//! | `--version` | stable | libtorch release; empty scrapes pytorch.org for the current stable one. |
//! | `--targetdir` | `.` | Directory receiving the archive and the unpacked tree. |
//! | `--force` | off | Redownload and re-extract even when artifacts already exist. |
//!
//! Exit codes: `0` on success, `1` when the workflow fails, `2` for usage
//! errors. Log verbosity follows `RUST_LOG`, defaulting to `info`.

use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use torchload::{BuildFlavor, Platform, TorchLoader, TorchloadResult};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "torchload-cli",
    about = "Download and unpack a prebuilt libtorch archive"
)]
struct Cli {
    /// Require a CUDA-enabled archive; reject a request that resolves to cpu.
    #[arg(long)]
    cuda: bool,

    /// Operating system to fetch for (linux, macos, windows, or an alias).
    #[arg(long, default_value = std::env::consts::OS)]
    os: String,

    /// CUDA toolkit version, e.g. 11.8, 118, or cpu.
    #[arg(long = "cuv", alias = "cuda_version", default_value = "cpu")]
    cuv: String,

    /// Archive build flavor; only Windows publishes both.
    #[arg(long, default_value = "debug", value_enum)]
    build: BuildFlavor,

    /// Directory receiving the archive and the unpacked tree.
    #[arg(long, default_value = ".")]
    targetdir: PathBuf,

    /// libtorch release, e.g. 2.4.0; empty means the current stable release.
    #[arg(long, default_value = "")]
    version: String,

    /// Redownload and re-extract even when artifacts already exist.
    #[arg(long)]
    force: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("torchload: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> TorchloadResult<()> {
    let platform = Platform::parse(&cli.os)?;

    let mut loader = TorchLoader::new(platform)
        .build_flavor(cli.build)
        .cuda_requested(cli.cuda)
        .cuda_version(cli.cuv)
        .target_dir(cli.targetdir)
        .force(cli.force);
    if !cli.version.is_empty() {
        loader = loader.version(cli.version);
    }

    // The bar only exists once the first chunk arrives, so skipped downloads
    // stay silent.
    let mut bar: Option<ProgressBar> = None;
    let outcome = loader.run(|done, total| {
        let bar = bar.get_or_insert_with(|| match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        });
        bar.set_position(done);
    });
    if let Some(bar) = bar.take() {
        bar.finish_and_clear();
    }

    println!("{}", outcome?);
    Ok(())
}
