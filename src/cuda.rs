use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static MAJOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}").unwrap());
static SEPARATED_MINOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._-](\d+)").unwrap());
static JOINED_MINOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2}(\d+)").unwrap());

/// Accelerator selector for an archive: plain CPU, or a CUDA toolkit release
/// rendered as the download channel `cu{major}{minor}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CudaTag {
    Cpu,
    Cuda { major: String, minor: String },
}

impl CudaTag {
    /// Read a CUDA toolkit version out of a free-form string.
    ///
    /// `"11.0"`, `"110"`, `"11-0"`, `"11_0"`, and `"cu110"` all mean `cu110`.
    /// The first run of one or two digits is the major; the minor is whichever
    /// comes first of digits behind a `.`/`-`/`_` separator or a digit run
    /// right after a two-digit major, defaulting to `0` when neither appears.
    ///
    /// Never fails: `"cpu"` is CPU by definition, and input with no digits at
    /// all logs a warning and degrades to CPU rather than aborting the run.
    pub fn parse(raw: &str) -> Self {
        if raw == "cpu" {
            return CudaTag::Cpu;
        }
        let Some(major) = MAJOR_RE.find(raw) else {
            crate::warn!(
                "CUDA version `{raw}` could not be identified; continuing with the cpu archive"
            );
            return CudaTag::Cpu;
        };

        let separated = SEPARATED_MINOR_RE.captures(raw).and_then(|c| c.get(1));
        let joined = JOINED_MINOR_RE.captures(raw).and_then(|c| c.get(1));
        // Both patterns can hit on input like `113-5`; the earlier match wins.
        let minor = match (separated, joined) {
            (Some(s), Some(j)) => Some(if s.start() <= j.start() { s } else { j }),
            (s, j) => s.or(j),
        };

        CudaTag::Cuda {
            major: major.as_str().to_string(),
            minor: minor.map_or_else(|| "0".to_string(), |m| m.as_str().to_string()),
        }
    }

    pub fn is_cuda(&self) -> bool {
        matches!(self, CudaTag::Cuda { .. })
    }

    /// Path segment used by the artifact host: `cpu`, `cu102`, `cu110`, ….
    pub fn channel(&self) -> String {
        match self {
            CudaTag::Cpu => "cpu".to_string(),
            CudaTag::Cuda { major, minor } => format!("cu{major}{minor}"),
        }
    }
}

impl std::fmt::Display for CudaTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.channel())
    }
}
