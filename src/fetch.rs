use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use url::Url;

use crate::error::{TorchloadError, TorchloadResult};

const CHUNK_SIZE: usize = 64 * 1024;

/// What the fetch actually did: where the archive sits, how many bytes went
/// over the wire, and whether an existing file short-circuited the transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub bytes: u64,
    pub skipped: bool,
}

/// Fetch `url` into `dest`, streaming chunks through `on_progress`.
///
/// * An existing `dest` with `overwrite` unset is reused as-is: no request
///   goes out and the outcome reports `skipped`.
/// * The body lands in a `.part` sibling first and is renamed into place only
///   once the stream completes, so a failed transfer never leaves a partial
///   file at `dest`.
/// * `on_progress` receives the cumulative byte count (monotonic) and the
///   total from the Content-Length header, when the server sent one.
///
/// One attempt per call; a failed transfer is reported, not retried.
pub fn fetch(
    url: &Url,
    dest: &Path,
    overwrite: bool,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> TorchloadResult<DownloadOutcome> {
    if dest.is_file() && !overwrite {
        crate::info!("Archive {} already exists; skipping download", dest.display());
        return Ok(DownloadOutcome {
            path: dest.to_path_buf(),
            bytes: 0,
            skipped: true,
        });
    }

    let part = {
        let mut name = dest.as_os_str().to_owned();
        name.push(".part");
        PathBuf::from(name)
    };

    crate::trace!("Downloading {} to {}", url, dest.display());
    let streamed = stream_body(url, &part, &mut on_progress).and_then(|bytes| {
        std::fs::rename(&part, dest).map_err(|e| {
            TorchloadError::file_system("move downloaded archive into place", part.clone(), e)
        })?;
        Ok(bytes)
    });

    match streamed {
        Ok(bytes) => Ok(DownloadOutcome {
            path: dest.to_path_buf(),
            bytes,
            skipped: false,
        }),
        Err(e) => {
            let _ = std::fs::remove_file(&part); // best-effort cleanup
            Err(e)
        }
    }
}

/// Single-attempt blocking GET that streams the body into `part` and returns
/// the number of bytes written.
fn stream_body(
    url: &Url,
    part: &Path,
    on_progress: &mut impl FnMut(u64, Option<u64>),
) -> TorchloadResult<u64> {
    let download_err = |reason: String| TorchloadError::Download {
        url: url.to_string(),
        reason,
    };

    match ureq::get(url.as_str()).call() {
        Ok(resp) if resp.status() == 200 => {
            let total = resp
                .headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            let mut reader = resp.into_body().into_reader();
            let mut file = std::fs::File::create(part).map_err(|e| {
                TorchloadError::file_system("create partial download file", part.to_path_buf(), e)
            })?;

            let mut buf = [0u8; CHUNK_SIZE];
            let mut written = 0u64;
            loop {
                let n = reader.read(&mut buf).map_err(|e| {
                    download_err(format!("connection failed after {written} bytes: {e}"))
                })?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n]).map_err(|e| {
                    TorchloadError::file_system(
                        "write to partial download file",
                        part.to_path_buf(),
                        e,
                    )
                })?;
                written += n as u64;
                on_progress(written, total);
            }
            Ok(written)
        }
        Ok(resp) => Err(download_err(format!("server answered HTTP {}", resp.status()))),
        Err(e) => Err(download_err(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn part_path(dest: &Path) -> PathBuf {
        let mut name = dest.as_os_str().to_owned();
        name.push(".part");
        PathBuf::from(name)
    }

    #[test]
    fn existing_archive_skips_the_network() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("libtorch.zip");
        fs::write(&dest, b"already here").unwrap();

        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/libtorch.zip").expect(0).create();

        let url = Url::parse(&format!("{}/libtorch.zip", server.url())).unwrap();
        let mut progress_calls = 0;
        let outcome = fetch(&url, &dest, false, |_, _| progress_calls += 1).unwrap();

        assert!(outcome.skipped);
        assert_eq!(outcome.bytes, 0);
        assert_eq!(outcome.path, dest);
        assert_eq!(progress_calls, 0, "no transfer, no progress");
        assert_eq!(fs::read(&dest).unwrap(), b"already here");
        mock.assert();
    }

    #[test]
    fn streams_with_monotonic_progress() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("archive.zip");
        let body = vec![7u8; 200_000];

        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/archive.zip")
            .with_status(200)
            .with_body(body.clone())
            .create();

        let url = Url::parse(&format!("{}/archive.zip", server.url())).unwrap();
        let mut seen: Vec<(u64, Option<u64>)> = Vec::new();
        let outcome = fetch(&url, &dest, false, |done, total| seen.push((done, total))).unwrap();

        assert!(!outcome.skipped);
        assert_eq!(outcome.bytes, body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);
        assert!(!part_path(&dest).exists(), "partial file must be renamed away");

        assert!(!seen.is_empty());
        assert!(
            seen.windows(2).all(|w| w[0].0 <= w[1].0),
            "progress must be monotonic"
        );
        assert_eq!(seen.last().unwrap().0, body.len() as u64);
        assert!(
            seen.iter().all(|(_, total)| *total == Some(body.len() as u64)),
            "content-length should be surfaced as the total"
        );
    }

    /// Chunked transfer carries no Content-Length header, so the callback
    /// never learns a total; the byte count must still come out right.
    #[test]
    fn missing_content_length_leaves_total_unknown() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("archive.zip");
        let body = vec![3u8; 150_000];

        let mut server = mockito::Server::new();
        let payload = body.clone();
        let _m = server
            .mock("GET", "/archive.zip")
            .with_chunked_body(move |out| out.write_all(&payload))
            .create();

        let url = Url::parse(&format!("{}/archive.zip", server.url())).unwrap();
        let mut seen: Vec<(u64, Option<u64>)> = Vec::new();
        let outcome = fetch(&url, &dest, false, |done, total| seen.push((done, total))).unwrap();

        assert!(!outcome.skipped);
        assert_eq!(outcome.bytes, body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);

        assert!(!seen.is_empty());
        assert!(
            seen.windows(2).all(|w| w[0].0 <= w[1].0),
            "progress must be monotonic"
        );
        assert_eq!(seen.last().unwrap().0, body.len() as u64);
        assert!(
            seen.iter().all(|(_, total)| total.is_none()),
            "without content-length the total stays unknown"
        );
    }

    #[test]
    fn http_error_leaves_no_file_behind() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("missing.zip");

        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/missing.zip").with_status(404).create();

        let url = Url::parse(&format!("{}/missing.zip", server.url())).unwrap();
        let err = fetch(&url, &dest, false, |_, _| {}).unwrap_err();

        assert!(matches!(err, TorchloadError::Download { .. }), "{err}");
        assert!(!dest.exists(), "no file may appear at the destination");
        assert!(!part_path(&dest).exists(), "partial file must be cleaned up");
    }

    #[test]
    fn overwrite_refetches_an_existing_archive() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("archive.zip");
        fs::write(&dest, b"stale").unwrap();

        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/archive.zip")
            .with_status(200)
            .with_body(b"fresh bytes".as_slice())
            .create();

        let url = Url::parse(&format!("{}/archive.zip", server.url())).unwrap();
        let outcome = fetch(&url, &dest, true, |_, _| {}).unwrap();

        assert!(!outcome.skipped);
        assert_eq!(fs::read(&dest).unwrap(), b"fresh bytes");
        mock.assert();
    }
}
