//! Archive download with size verification

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::http::HttpClient;
use crate::logging::Logger;

use super::common::{check_cancelled, InstallError};
use super::TaskContext;

/// Bytes read from the response body per iteration.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// What a finished transfer produced, before verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub written: u64,
    pub expected: Option<u64>,
}

/// Ask the server how large the file is. A missing or zero length means unknown.
pub fn probe_size(http: &HttpClient, url: &str) -> Result<Option<u64>, InstallError> {
    let length = http
        .content_length(url)
        .map_err(|e| InstallError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(length.filter(|n| *n > 0))
}

/// Copy `reader` into `writer` in fixed-size chunks, reporting progress and
/// honouring cancellation between chunks.
pub fn write_stream<R: Read, W: Write>(
    url: &str,
    mut reader: R,
    writer: &mut W,
    expected: Option<u64>,
    task: &TaskContext,
) -> Result<u64, InstallError> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let total = expected.unwrap_or(0);

    loop {
        check_cancelled(task)?;
        let read = reader
            .read(&mut buffer)
            .map_err(|e| InstallError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(InstallError::io("Failed to write download"))?;
        written += read as u64;

        if total > 0 {
            task.set_progress(written, total);
        }
    }

    writer
        .flush()
        .map_err(InstallError::io("Failed to write download"))?;
    Ok(written)
}

/// Compare the written size with the advertised one, deleting the file on mismatch.
pub fn verify_size(path: &Path, outcome: DownloadOutcome) -> Result<(), InstallError> {
    match outcome.expected {
        Some(expected) if expected > 0 && expected != outcome.written => {
            let _ = fs::remove_file(path);
            Err(InstallError::IntegrityMismatch {
                expected,
                actual: outcome.written,
            })
        }
        _ => Ok(()),
    }
}

/// Probe the size and stream the body to `dest`. The partial file is removed
/// on any failure.
pub fn fetch(
    http: &HttpClient,
    url: &str,
    dest: &Path,
    task: &TaskContext,
    logger: &Logger,
) -> Result<DownloadOutcome, InstallError> {
    logger.download(&format!("Downloading {}", url));

    let expected = probe_size(http, url)?;
    match expected {
        Some(n) => logger.debug(&format!("Expected size: {} bytes", n)),
        None => logger.debug("Server did not report a size, skipping integrity check"),
    }

    let response = http.get(url).map_err(|e| InstallError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(InstallError::io(format!("Failed to create {}", parent.display())))?;
    }
    let file = fs::File::create(dest)
        .map_err(InstallError::io(format!("Failed to create {}", dest.display())))?;
    let mut writer = BufWriter::new(file);

    let result = write_stream(url, response.into_reader(), &mut writer, expected, task);
    drop(writer);

    match result {
        Ok(written) => {
            logger.download(&format!("Downloaded {} bytes", written));
            Ok(DownloadOutcome { written, expected })
        }
        Err(e) => {
            let _ = fs::remove_file(dest);
            Err(e)
        }
    }
}

/// Download `url` to `dest` and check its size against the advertised length.
pub fn download_archive(
    http: &HttpClient,
    url: &str,
    dest: &Path,
    task: &TaskContext,
    logger: &Logger,
) -> Result<u64, InstallError> {
    let outcome = fetch(http, url, dest, task, logger)?;
    verify_size(dest, outcome)?;
    Ok(outcome.written)
}
