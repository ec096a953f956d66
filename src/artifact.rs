use serde::Serialize;
use url::Url;

use crate::{
    cuda::CudaTag,
    error::{TorchloadError, TorchloadResult},
    platform::{BuildFlavor, Platform},
};

const DOWNLOAD_BASE: &str = "https://download.pytorch.org/libtorch";

/// Reject request combinations the artifact host does not serve.
///
/// `cuda_requested` is the caller's explicit accelerator flag; a CUDA tag
/// implies the request on its own, so the flag only matters when it
/// contradicts a tag that resolved to CPU. Runs on plain values so every
/// rejection happens before any network traffic.
pub fn validate_request(
    platform: Platform,
    tag: &CudaTag,
    cuda_requested: bool,
) -> TorchloadResult<()> {
    if cuda_requested && !tag.is_cuda() {
        return Err(TorchloadError::IncompatibleConfig {
            reason: format!("CUDA was requested, but the toolkit version resolved to `{tag}`"),
        });
    }
    if platform == Platform::Macos && (cuda_requested || tag.is_cuda()) {
        return Err(TorchloadError::IncompatibleConfig {
            reason: format!(
                "CUDA tag `{tag}` and operating system `{platform}` are incompatible; \
                 only cpu archives are published for macos"
            ),
        });
    }
    Ok(())
}

/// Fully resolved archive identity: the local file name and the remote URL.
///
/// The host encodes the cpu suffix as `%2Bcpu` in the URL but the archive is
/// conventionally stored under the decoded `+cpu` name locally, so the two
/// spellings differ exactly there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactId {
    /// Local archive name, e.g. `libtorch-cxx11-abi-shared-with-deps-1.9.0+cpu.zip`.
    pub file_name: String,
    /// Remote location under the per-channel directory of the artifact host.
    pub url: Url,
}

impl ArtifactId {
    pub fn new(
        platform: Platform,
        build: BuildFlavor,
        tag: &CudaTag,
        version: &str,
    ) -> TorchloadResult<Self> {
        validate_request(platform, tag, false)?;

        let mut stem = format!("{}-{version}", platform.base_file_name(build));
        if !tag.is_cuda() {
            stem.push_str("%2Bcpu");
        }

        let url_str = format!("{DOWNLOAD_BASE}/{}/{stem}.zip", tag.channel());
        let url = Url::parse(&url_str).map_err(|e| TorchloadError::Resolution {
            reason: format!("assembled artifact URL `{url_str}` is invalid: {e}"),
        })?;

        Ok(ArtifactId {
            file_name: format!("{}.zip", stem.replace("%2B", "+")),
            url,
        })
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name)
    }
}
