use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{TorchloadError, TorchloadResult},
    platform::{BuildFlavor, Platform},
};

/// Directory name every libtorch archive unpacks to.
pub const UNPACK_DIR: &str = "libtorch";
/// Name the unpacked tree gets for Windows debug builds, so debug and release
/// can coexist in one target directory.
pub const DEBUG_UNPACK_DIR: &str = "libtorch_debug";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallStatus {
    /// The archive was extracted (and renamed, for Windows debug) this run.
    Installed,
    /// A conventional directory was already present; nothing was touched.
    AlreadyInstalled,
}

/// Unpack `archive` into `target_dir`.
///
/// An existing `libtorch`/`libtorch_debug` directory short-circuits the whole
/// step unless `force` is set, and the archive stays on disk in that case
/// since it may be the only copy. After a successful extraction the archive
/// is removed. Windows debug archives also unpack to `libtorch`, so that tree
/// is renamed to `libtorch_debug` once extraction has fully completed.
pub fn install(
    archive: &Path,
    target_dir: &Path,
    platform: Platform,
    build: BuildFlavor,
    force: bool,
) -> TorchloadResult<InstallStatus> {
    let already_unpacked = [UNPACK_DIR, DEBUG_UNPACK_DIR]
        .iter()
        .any(|dir| target_dir.join(dir).is_dir());
    if already_unpacked && !force {
        crate::info!("Target folder to unpack into already exists; leaving the archive unpacked");
        return Ok(InstallStatus::AlreadyInstalled);
    }

    extract_archive(archive, target_dir)?;

    if platform == Platform::Windows && build == BuildFlavor::Debug {
        let unpacked = target_dir.join(UNPACK_DIR);
        if !unpacked.is_dir() {
            return Err(TorchloadError::Extraction {
                archive: archive.to_path_buf(),
                reason: format!(
                    "expected a `{UNPACK_DIR}` directory to rename to `{DEBUG_UNPACK_DIR}`, \
                     but the archive produced none"
                ),
            });
        }
        std::fs::rename(&unpacked, target_dir.join(DEBUG_UNPACK_DIR))
            .map_err(|e| TorchloadError::file_system("rename unpacked directory", unpacked, e))?;
    }

    std::fs::remove_file(archive).map_err(|e| {
        TorchloadError::file_system("remove archive after extraction", archive.to_path_buf(), e)
    })?;
    Ok(InstallStatus::Installed)
}

/// Extract every entry, keeping the archive's internal layout (the top-level
/// `libtorch/` folder is load-bearing). Entries whose names would escape
/// `target_dir` are skipped.
fn extract_archive(archive: &Path, target_dir: &Path) -> TorchloadResult<()> {
    let file = std::fs::File::open(archive)
        .map_err(|e| TorchloadError::file_system("open archive", archive.to_path_buf(), e))?;

    let mut zip = zip::ZipArchive::new(file).map_err(|e| TorchloadError::Extraction {
        archive: archive.to_path_buf(),
        reason: format!("not a readable zip archive: {e}"),
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| TorchloadError::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("entry {i} is unreadable: {e}"),
        })?;

        let rel = match entry.enclosed_name() {
            Some(p) => p.to_owned(),
            None => continue, // skip entries with invalid / malicious names
        };
        let out = target_dir.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| {
                TorchloadError::file_system("create directory from archive entry", out.clone(), e)
            })?;
            continue;
        }

        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TorchloadError::file_system(
                    "create parent directory from archive entry",
                    parent.to_path_buf(),
                    e,
                )
            })?;
        }
        let mut out_file = std::fs::File::create(&out).map_err(|e| {
            TorchloadError::file_system("create file from archive entry", out.clone(), e)
        })?;

        std::io::copy(&mut entry, &mut out_file).map_err(|e| {
            TorchloadError::file_system("copy contents from archive entry", out.clone(), e)
        })?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode)).map_err(|e| {
                TorchloadError::file_system("set permissions from archive entry", out.clone(), e)
            })?;
        }
    }

    Ok(())
}
