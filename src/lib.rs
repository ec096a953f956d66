//! # torchload
//!
//! Download and unpack prebuilt **libtorch** archives from
//! [download.pytorch.org](https://download.pytorch.org/) for a chosen
//! platform, build flavor, and CUDA toolkit.
//!
//! | Module | Role |
//! |--------|------|
//! | [`platform`] | Operating-system aliases and per-platform archive stems. |
//! | [`cuda`] | Lenient CUDA toolkit parsing into a download channel (`cpu`, `cu118`, …). |
//! | [`version`] | Release resolution, scraping the current stable release when none is given. |
//! | [`artifact`] | Compatibility validation plus archive name and URL assembly. |
//! | [`fetch`] | Streaming download with progress reporting and skip-if-present. |
//! | [`install`] | Zip extraction, Windows debug renaming, archive cleanup. |
//! | [`loader`] | [`TorchLoader`], the one-call workflow tying it all together. |
//!
//! ## Quick start
//!
//! ```no_run
//! use torchload::{Platform, TorchLoader, TorchloadResult};
//!
//! fn main() -> TorchloadResult<()> {
//!     let outcome = TorchLoader::new(Platform::Linux)
//!         .cuda_version("11.8")
//!         .version("2.4.0")
//!         .target_dir("vendor")
//!         .run(|_done, _total| {})?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```
//!
//! Leave [`TorchLoader::version`] unset to load whatever pytorch.org currently
//! advertises as stable. A run that finds both the archive and the unpacked
//! tree already in the target directory is a no-op: nothing is fetched and
//! nothing is extracted unless [`TorchLoader::force`] is set.
//!
//! The `torchload-cli` binary wraps the loader one-to-one; see its `--help`.
//!
//! ## Feature flags
//!
//! * `scrape` *(default)*: resolve the stable release by scraping
//!   <https://pytorch.org/get-started/locally/> when no explicit version is
//!   given. Disabling it drops the `scraper` dependency and makes an explicit
//!   version mandatory.

#[allow(unused_imports)]
use tracing::{Level, debug, error, info, span, trace, warn};

pub mod artifact;
pub mod cuda;
pub mod error;
pub mod fetch;
pub mod install;
pub mod loader;
pub mod platform;
pub mod version;

pub use artifact::*;
pub use cuda::*;
pub use error::*;
pub use fetch::*;
pub use install::*;
pub use loader::*;
pub use platform::*;
pub use version::*;
