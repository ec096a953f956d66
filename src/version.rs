//! Release-version resolution: explicit values pass through untouched, and an
//! omitted version is scraped from the pytorch.org "get started" page.

use crate::error::{TorchloadError, TorchloadResult};

/// Page carrying the current stable release in its version selector widget.
pub const PYTORCH_URL: &str = "https://pytorch.org/get-started/locally/";

/// Decide which libtorch release to fetch.
///
/// A non-empty explicit version is trusted verbatim; nothing checks that the
/// release actually exists, so a typo surfaces later as a failed download.
/// With no version given, the stable release is scraped from
/// [`PYTORCH_URL`] (requires the `scrape` cargo feature).
pub fn resolve(explicit: Option<&str>) -> TorchloadResult<String> {
    match explicit {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => scrape_stable(),
    }
}

#[cfg(not(feature = "scrape"))]
fn scrape_stable() -> TorchloadResult<String> {
    Err(TorchloadError::Resolution {
        reason: "no release version was given and HTML scraping is not compiled in; \
                 provide an explicit version or rebuild with the `scrape` feature enabled"
            .to_string(),
    })
}

#[cfg(feature = "scrape")]
fn scrape_stable() -> TorchloadResult<String> {
    let html = fetch_page(PYTORCH_URL)?;
    let version = stable_version_from_html(&html)?;
    crate::info!("Resolved stable libtorch release {version} from {PYTORCH_URL}");
    Ok(version)
}

/// Blocking GET of the release page body. Failures here are resolution
/// failures, not download failures; there is no retry.
#[cfg(feature = "scrape")]
fn fetch_page(url: &str) -> TorchloadResult<String> {
    match ureq::get(url).call() {
        Ok(mut resp) if resp.status() == 200 => {
            resp.body_mut()
                .read_to_string()
                .map_err(|e| TorchloadError::Resolution {
                    reason: format!("failed to read release page {url}: {e}"),
                })
        }
        Ok(resp) => Err(TorchloadError::Resolution {
            reason: format!("release page {url} answered HTTP {}", resp.status()),
        }),
        Err(e) => Err(TorchloadError::Resolution {
            reason: format!("request to release page {url} failed: {e}"),
        }),
    }
}

/// Pull the parenthesized release out of the `stable` widget, e.g.
/// `Stable (2.4.0)` → `2.4.0`.
#[cfg(feature = "scrape")]
fn stable_version_from_html(html: &str) -> TorchloadResult<String> {
    use std::sync::LazyLock;

    use regex::Regex;
    use scraper::{Html, Selector};

    static VERSION_TOKEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\(([\w.]+)\)").unwrap());

    let selector = |css: &'static str| {
        Selector::parse(css).map_err(|e| TorchloadError::Resolution {
            reason: format!("invalid selector `{css}`: {e}"),
        })
    };
    let stable = selector("div#stable")?;
    let option_text = selector("div.option-text")?;

    let document = Html::parse_document(html);
    let widget = document
        .select(&stable)
        .next()
        .ok_or_else(|| TorchloadError::Resolution {
            reason: "release page has no `stable` version widget".to_string(),
        })?;
    let label = widget
        .select(&option_text)
        .next()
        .ok_or_else(|| TorchloadError::Resolution {
            reason: "`stable` widget has no option-text label".to_string(),
        })?;

    let text: String = label.text().collect();
    let token = VERSION_TOKEN_RE
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| TorchloadError::Resolution {
            reason: format!("no parenthesized release in label `{}`", text.trim()),
        })?;
    Ok(token.as_str().to_string())
}
