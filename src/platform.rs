use serde::{Deserialize, Serialize};

use crate::error::{TorchloadError, TorchloadResult};

const LINUX_ALIASES: &[&str] = &["lin", "linux", "ubuntu", "unix"];
const MACOS_ALIASES: &[&str] = &["mac", "darwin", "apple", "macos", "osx"];
const WINDOWS_ALIASES: &[&str] = &["win", "windows", "win10", "win64", "win32"];

/// Operating system a libtorch archive is published for.
///
/// Parsed from user input rather than detected here; the host value from
/// [`std::env::consts::OS`] is resolved once at the CLI boundary and passed
/// down like any other request field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Normalize a user-supplied OS name, case-insensitively.
    ///
    /// Accepts the common aliases for each family (`lin`, `ubuntu`, `darwin`,
    /// `win10`, …) as well as every value [`std::env::consts::OS`] produces on
    /// a supported host. Anything else is an error, never a guess.
    pub fn parse(raw: &str) -> TorchloadResult<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        if LINUX_ALIASES.contains(&lowered.as_str()) {
            Ok(Platform::Linux)
        } else if MACOS_ALIASES.contains(&lowered.as_str()) {
            Ok(Platform::Macos)
        } else if WINDOWS_ALIASES.contains(&lowered.as_str()) {
            Ok(Platform::Windows)
        } else {
            Err(TorchloadError::UnsupportedPlatform {
                requested: raw.to_string(),
            })
        }
    }

    /// Stem of the published archive for this platform and build flavor,
    /// before the release version and accelerator suffix are attached.
    ///
    /// Only Windows distinguishes debug from release archives; the other
    /// platforms publish a single flavor.
    pub fn base_file_name(&self, build: BuildFlavor) -> &'static str {
        match (self, build) {
            (Platform::Linux, _) => "libtorch-cxx11-abi-shared-with-deps",
            (Platform::Macos, _) => "libtorch-macos",
            (Platform::Windows, BuildFlavor::Debug) => "libtorch-win-shared-with-deps-debug",
            (Platform::Windows, BuildFlavor::Release) => "libtorch-win-shared-with-deps",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Macos => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

/// Debug vs release flavor of the requested archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum BuildFlavor {
    Debug,
    Release,
}

impl Default for BuildFlavor {
    fn default() -> Self {
        BuildFlavor::Debug
    }
}

impl std::fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildFlavor::Debug => write!(f, "debug"),
            BuildFlavor::Release => write!(f, "release"),
        }
    }
}
