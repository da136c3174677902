use std::io::Write;

use anyhow::{Context, Result};

use prep_util::prettyprint_usize;

/// Downloads bytes from a URL. If `quiet` is false, logs progress every 10%. This must be called
/// with a tokio runtime somewhere.
pub async fn download_bytes<I: AsRef<str>>(url: I, quiet: bool) -> Result<Vec<u8>> {
    let url = url.as_ref();
    let mut resp = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {}", url))?;
    resp.error_for_status_ref()
        .with_context(|| format!("downloading {}", url))?;

    let total_size = resp.content_length().map(|x| x as usize);
    let mut bytes = Vec::new();
    let mut next_report = 10;
    while let Some(chunk) = resp
        .chunk()
        .await
        .with_context(|| format!("reading body of {}", url))?
    {
        bytes.write_all(&chunk)?;
        if let Some(n) = total_size {
            let pct = (bytes.len() as f64) / (n as f64) * 100.0;
            if !quiet && n > 0 && pct >= next_report as f64 {
                info!(
                    "{:.0}% ({} / {} bytes)",
                    pct,
                    prettyprint_usize(bytes.len()),
                    prettyprint_usize(n)
                );
                next_report += 10;
            }
        }
    }
    Ok(bytes)
}

/// Downloads a file, creating the parent directory. The file is only written once the whole body
/// has arrived. This must be called with a tokio runtime somewhere.
pub async fn download_to_file<I: AsRef<str>>(url: I, path: &str, quiet: bool) -> Result<()> {
    let bytes = download_bytes(url, quiet).await?;
    crate::create_parent_dir(path)?;
    let mut file = fs_err::File::create(path)?;
    file.write_all(&bytes)?;
    info!("Wrote {} bytes to {}", prettyprint_usize(bytes.len()), path);
    Ok(())
}
