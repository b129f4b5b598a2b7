//! Streams a remote file to disk, optionally gzip-compressing it on receipt.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use flate2::{write::GzEncoder, Compression};
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::error::{Error, Result};

pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Downloads `url` to `file_path`. The caller owns the file extension; `.gz`
/// is never appended here. A non-2xx status is an error raised before the file
/// is created; a transfer that fails later leaves the partial file in place.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    file_path: &Path,
    use_compression: bool,
    progress_bar: ProgressBar,
) -> Result<u64> {
    let response = client.get(url).send().await?.error_for_status()?;

    // Convert spinner to progress bar if we have size info
    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress_bar.set_length(total_size);
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}")
        {
            progress_bar.set_style(style.progress_chars("=> "));
        }
    }

    save_stream(response.bytes_stream(), file_path, use_compression, &progress_bar).await
}

/// Writes every chunk of `stream` to `file_path` through an 8 KiB buffer.
pub async fn save_stream<S, B, E>(
    stream: S,
    file_path: &Path,
    use_compression: bool,
    progress_bar: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = core::result::Result<B, E>>,
    B: AsRef<[u8]>,
    Error: From<E>,
{
    let stream = std::pin::pin!(stream);
    let file = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, File::create(file_path)?);

    if use_compression {
        let mut encoder = GzEncoder::new(file, Compression::default());
        let downloaded = write_stream(stream, &mut encoder, progress_bar).await?;
        encoder.finish()?.flush()?;
        Ok(downloaded)
    } else {
        let mut file = file;
        let downloaded = write_stream(stream, &mut file, progress_bar).await?;
        file.flush()?;
        Ok(downloaded)
    }
}

async fn write_stream<S, B, E, W>(mut stream: S, writer: &mut W, progress_bar: &ProgressBar) -> Result<u64>
where
    S: Stream<Item = core::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    Error: From<E>,
    W: Write,
{
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let bytes = chunk.as_ref();
        if bytes.is_empty() {
            continue;
        }
        writer.write_all(bytes)?;
        downloaded += bytes.len() as u64;
        progress_bar.set_position(downloaded);
    }

    Ok(downloaded)
}

// -- Tests -------------------------------------------------------------------
