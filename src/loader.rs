//! High-level public API for obtaining a libtorch distribution
//! ===========================================================
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`TorchLoader`] | Captures every input: platform, build flavor, CUDA version, release, target directory. |
//! | [`LoadOutcome`] | Serialisable summary: resolved release, archive name, byte count, install status, duration. |
//!
//! The loader validates the request, resolves the release version, assembles
//! the archive identity, downloads, and unpacks, strictly in that order.
//! Impossible requests (CUDA on macOS, a CUDA flag contradicting a cpu tag,
//! scraping without the `scrape` feature) therefore fail before any network
//! traffic.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    artifact::{self, ArtifactId},
    cuda::CudaTag,
    error::{TorchloadError, TorchloadResult},
    fetch::{self, DownloadOutcome},
    install::{self, InstallStatus},
    platform::{BuildFlavor, Platform},
    version,
};

/// Everything a single load needs, captured up front.
///
/// Build one with [`TorchLoader::new`], chain any setters, then call
/// [`run`](Self::run). The fields are plain values; nothing here touches the
/// environment, so the same loader can be serialized, logged, or replayed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TorchLoader {
    /// Platform to fetch for, resolved from user input at the boundary.
    pub platform: Platform,
    /// Debug or release archive (only Windows distinguishes them).
    pub build: BuildFlavor,
    /// Explicit accelerator request, on top of whatever the tag implies.
    pub cuda_requested: bool,
    /// Raw CUDA toolkit version; parsed leniently, `cpu` selects CPU archives.
    pub cuda_version: String,
    /// libtorch release. `None` (or empty) means scrape the stable release.
    pub version: Option<String>,
    /// Directory receiving both the archive and the unpacked tree.
    pub target_dir: PathBuf,
    /// Redownload and re-extract even when artifacts are already present.
    pub force: bool,
}

impl TorchLoader {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            build: BuildFlavor::default(),
            cuda_requested: false,
            cuda_version: "cpu".to_string(),
            version: None,
            target_dir: PathBuf::from("."),
            force: false,
        }
    }

    pub fn build_flavor(mut self, build: BuildFlavor) -> Self {
        self.build = build;
        self
    }

    pub fn cuda_requested(mut self, requested: bool) -> Self {
        self.cuda_requested = requested;
        self
    }

    pub fn cuda_version(mut self, version: impl Into<String>) -> Self {
        self.cuda_version = version.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = dir.into();
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Resolve, download, and unpack, reporting download progress through
    /// `on_progress` (cumulative bytes, total when known).
    pub fn run(
        &self,
        mut on_progress: impl FnMut(u64, Option<u64>),
    ) -> TorchloadResult<LoadOutcome> {
        let t0 = std::time::Instant::now();
        crate::debug!("{self}");

        let tag = CudaTag::parse(&self.cuda_version);
        artifact::validate_request(self.platform, &tag, self.cuda_requested)?;

        let version = version::resolve(self.version.as_deref())?;
        let artifact = ArtifactId::new(self.platform, self.build, &tag, &version)?;

        std::fs::create_dir_all(&self.target_dir).map_err(|e| {
            TorchloadError::file_system("create target directory", self.target_dir.clone(), e)
        })?;

        let dest = self.target_dir.join(&artifact.file_name);
        crate::info!("Loading {} from {}", artifact.file_name, artifact.url);
        let download = fetch::fetch(&artifact.url, &dest, self.force, &mut on_progress)?;
        let install = install::install(
            &download.path,
            &self.target_dir,
            self.platform,
            self.build,
            self.force,
        )?;

        Ok(LoadOutcome {
            duration: t0.elapsed(),
            version,
            file_name: artifact.file_name,
            url: artifact.url,
            download,
            install,
        })
    }
}

impl std::fmt::Display for TorchLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        writeln!(f, "TorchLoader:")?;
        let mut indented = indenter::indented(f).with_str("   ");
        writeln!(indented, "Platform: {}", self.platform)?;
        writeln!(indented, "Build flavor: {}", self.build)?;
        writeln!(indented, "CUDA requested: {}", self.cuda_requested)?;
        writeln!(indented, "CUDA version: {}", self.cuda_version)?;
        writeln!(
            indented,
            "Release: {}",
            self.version.as_deref().unwrap_or("stable (scraped)")
        )?;
        writeln!(indented, "Target dir: {}", self.target_dir.display())?;
        writeln!(indented, "Force: {}", self.force)?;
        Ok(())
    }
}

/// Human-readable summary returned by [`TorchLoader::run`]. Implements
/// [`Display`](std::fmt::Display) for pretty printing.
#[derive(Serialize, Debug)]
pub struct LoadOutcome {
    /// End-to-end wall-clock time for the whole workflow.
    pub duration: Duration,
    /// libtorch release that was loaded, explicit or scraped.
    pub version: String,
    /// Local archive name inside the target directory.
    pub file_name: String,
    /// Remote archive location.
    pub url: Url,
    /// What the fetch step did.
    pub download: DownloadOutcome,
    /// Whether the unpacked tree is new or was already present.
    pub install: InstallStatus,
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        writeln!(f, "LoadOutcome:")?;
        let mut indented = indenter::indented(f).with_str("   ");
        writeln!(indented, "Duration: {:?}", self.duration)?;
        writeln!(indented, "Release: {}", self.version)?;
        writeln!(indented, "Archive: {}", self.file_name)?;
        writeln!(indented, "Url: {}", self.url)?;
        if self.download.skipped {
            writeln!(indented, "Downloaded: skipped (archive already present)")?;
        } else {
            writeln!(indented, "Downloaded: {} bytes", self.download.bytes)?;
        }
        writeln!(indented, "Install: {:?}", self.install)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_are_cpu_debug_current_dir() {
        let loader = TorchLoader::new(Platform::Linux);
        assert_eq!(loader.build, BuildFlavor::Debug);
        assert!(!loader.cuda_requested);
        assert_eq!(loader.cuda_version, "cpu");
        assert_eq!(loader.version, None);
        assert_eq!(loader.target_dir, PathBuf::from("."));
        assert!(!loader.force);
    }

    /// With the archive and an unpacked tree both present, a run touches
    /// neither the network nor the file system.
    #[test]
    fn fully_loaded_target_is_left_untouched() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("libtorch")).unwrap();
        let archive = tmp
            .path()
            .join("libtorch-cxx11-abi-shared-with-deps-2.4.0+cpu.zip");
        fs::write(&archive, b"placeholder").unwrap();

        let mut progress_calls = 0;
        let outcome = TorchLoader::new(Platform::Linux)
            .version("2.4.0")
            .target_dir(tmp.path())
            .run(|_, _| progress_calls += 1)
            .unwrap();

        assert!(outcome.download.skipped);
        assert_eq!(outcome.install, InstallStatus::AlreadyInstalled);
        assert_eq!(outcome.version, "2.4.0");
        assert_eq!(
            outcome.file_name,
            "libtorch-cxx11-abi-shared-with-deps-2.4.0+cpu.zip"
        );
        assert_eq!(progress_calls, 0);
        assert!(archive.exists(), "archive survives the skip path");
    }

    /// Incompatibility checks run before version resolution; with no version
    /// set, resolution would otherwise go to the network.
    #[test]
    fn macos_cuda_fails_before_version_resolution() {
        let err = TorchLoader::new(Platform::Macos)
            .cuda_version("10.2")
            .run(|_, _| {})
            .unwrap_err();
        assert!(
            matches!(err, TorchloadError::IncompatibleConfig { .. }),
            "{err}"
        );
        assert!(err.to_string().contains("macos"), "got: {err}");
    }

    #[test]
    fn cuda_request_contradicting_cpu_tag_fails() {
        let err = TorchLoader::new(Platform::Linux)
            .cuda_requested(true)
            .version("2.4.0")
            .run(|_, _| {})
            .unwrap_err();
        assert!(
            matches!(err, TorchloadError::IncompatibleConfig { .. }),
            "{err}"
        );
    }

    #[cfg(not(feature = "scrape"))]
    #[test]
    fn omitted_version_without_scrape_feature_fails_with_guidance() {
        let tmp = tempdir().unwrap();
        let err = TorchLoader::new(Platform::Linux)
            .target_dir(tmp.path())
            .run(|_, _| {})
            .unwrap_err();
        assert!(matches!(err, TorchloadError::Resolution { .. }), "{err}");
        assert!(err.to_string().contains("scrape"), "got: {err}");
    }

    #[test]
    fn outcome_display_summarizes_the_run() {
        let outcome = LoadOutcome {
            duration: Duration::from_millis(1200),
            version: "2.4.0".to_string(),
            file_name: "libtorch-cxx11-abi-shared-with-deps-2.4.0+cpu.zip".to_string(),
            url: Url::parse(
                "https://download.pytorch.org/libtorch/cpu/libtorch-cxx11-abi-shared-with-deps-2.4.0%2Bcpu.zip",
            )
            .unwrap(),
            download: DownloadOutcome {
                path: PathBuf::from("libtorch-cxx11-abi-shared-with-deps-2.4.0+cpu.zip"),
                bytes: 42,
                skipped: false,
            },
            install: InstallStatus::Installed,
        };
        let rendered = outcome.to_string();
        assert!(rendered.contains("LoadOutcome:"));
        assert!(rendered.contains("Release: 2.4.0"));
        assert!(rendered.contains("Downloaded: 42 bytes"));
        assert!(rendered.contains("Install: Installed"));
    }

    #[test]
    fn loader_display_names_every_input() {
        let rendered = TorchLoader::new(Platform::Windows)
            .build_flavor(BuildFlavor::Release)
            .cuda_version("11.8")
            .to_string();
        assert!(rendered.contains("Platform: windows"));
        assert!(rendered.contains("Build flavor: release"));
        assert!(rendered.contains("CUDA version: 11.8"));
        assert!(rendered.contains("Release: stable (scraped)"));
    }
}
