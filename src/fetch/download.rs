//! HTTPS download of the pinned source tarballs.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::ProvisionError;
use crate::output;

/// Download `url` to `dest`, streaming with a progress bar.
///
/// Returns the number of bytes written. Unreachable hosts and transfer
/// failures map to `ProvisionError::Network`.
pub fn download(url: &str, dest: &Path) -> Result<u64, ProvisionError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let response = ureq::get(url).call().map_err(|e| ProvisionError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let pb = match response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        Some(len) => output::download_progress(len),
        None => output::spinner(&format!("downloading {}", filename)),
    };

    let mut file = std::fs::File::create(dest)?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| ProvisionError::Network {
            url: url.to_string(),
            reason: format!("read error: {}", e),
        })?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));
    Ok(total_bytes)
}
