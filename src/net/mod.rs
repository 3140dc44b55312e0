//! # Remote Fetch
//!
//! Downloads a URL into a file, optionally gunzipping it on the way.
//!
//! The response body is treated as an opaque byte source. An async task pulls chunks from
//! the connection and pushes them through a bounded channel; a blocking writer on the other
//! end reads them as a plain [`Read`] stream, optionally wraps it in a gzip decoder, and
//! copies it into the destination with [`copy_stream`].
//!
//! Two independent bounds apply: `connect_timeout` on establishing the connection and
//! `read_timeout` on every wait for data (the headers and each body chunk).

use std::fs::File;
use std::future::Future;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use bytes::{Buf, Bytes};
use flate2::read::MultiGzDecoder;
use reqwest::{Client, Url};
use scopeguard::ScopeGuard;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::FetchOptions;
use crate::copier::copy_stream;
use crate::error::{io_at, FileKitError, Result};
use crate::fsx;

/// Chunks buffered between the network task and the file writer.
const CHANNEL_DEPTH: usize = 16;

/// What the network task hands the file writer.
///
/// The writer only keeps its output after `End`. A channel that closes without it (the
/// fetch was aborted or dropped) counts as a failed transfer.
#[derive(Debug)]
enum Frame {
    Chunk(Bytes),
    End,
    Failed(io::Error),
}

/// How the body is turned into file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// Write the bytes as received.
    Identity,
    /// The body is a gzip stream; write the decompressed bytes.
    Gzip,
}

/// Downloads `url` into `destination` as-is. Returns the number of bytes written.
pub async fn fetch_to_file(url: &str, destination: &Path, options: &FetchOptions) -> Result<u64> {
    fetch_into(url, destination, options, BodyEncoding::Identity).await
}

/// Downloads a gzip-compressed `url` and writes the decompressed content to `destination`.
/// Returns the number of decompressed bytes written.
pub async fn fetch_gunzip(url: &str, destination: &Path, options: &FetchOptions) -> Result<u64> {
    fetch_into(url, destination, options, BodyEncoding::Gzip).await
}

pub async fn fetch_into(
    url: &str,
    destination: &Path,
    options: &FetchOptions,
    encoding: BodyEncoding,
) -> Result<u64> {
    let url = Url::parse(url).map_err(|e| FileKitError::InvalidUrl(format!("{url}: {e}")))?;
    fsx::ensure_parent_dir(destination)?;

    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    let target = destination.to_path_buf();
    let writer = tokio::task::spawn_blocking(move || write_body(ChannelReader::new(rx), &target, encoding));

    let fetched = stream_body(&url, options, tx).await;
    let written = writer.await?;
    // A network failure is the root cause even when the writer failed because of it.
    fetched?;
    let written = written?;
    info!(url = %url, output = %destination.display(), bytes = written, ?encoding, "fetched");
    Ok(written)
}

/// Runs the transfer and tells the writer how it ended. A failure poisons the channel so
/// the writer discards its output instead of keeping a truncated file.
async fn stream_body(url: &Url, options: &FetchOptions, tx: mpsc::Sender<Frame>) -> Result<()> {
    let result = pump(url, options, &tx).await;
    let last = match &result {
        Ok(()) => Frame::End,
        Err(e) => Frame::Failed(io::Error::new(io::ErrorKind::Other, e.to_string())),
    };
    // The writer may already have given up; its own error is reported then.
    let _ = tx.send(last).await;
    result
}

async fn pump(url: &Url, options: &FetchOptions, tx: &mpsc::Sender<Frame>) -> Result<()> {
    let client = build_client(options)?;
    let read_timeout = || FileKitError::ReadTimeout {
        url: url.to_string(),
        timeout: options.read_timeout.unwrap_or_default(),
    };

    let mut response = within(options.header_timeout(), client.get(url.clone()).send())
        .await
        .ok_or_else(read_timeout)?
        .map_err(|e| classify(e, url, options))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FileKitError::HttpStatus { url: url.to_string(), status: status.as_u16() });
    }
    debug!(url = %url, %status, length = ?response.content_length(), "response headers received");

    loop {
        let chunk = within(options.read_timeout, response.chunk())
            .await
            .ok_or_else(read_timeout)?
            .map_err(|e| classify(e, url, options))?;
        let Some(chunk) = chunk else { return Ok(()) };
        if tx.send(Frame::Chunk(chunk)).await.is_err() {
            // Writer gave up; its own error is reported instead.
            return Ok(());
        }
    }
}

fn build_client(options: &FetchOptions) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(connect) = options.connect_timeout {
        builder = builder.connect_timeout(connect);
    }
    if !options.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// Awaits `fut`, giving up after `limit` if one is set.
async fn within<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn classify(err: reqwest::Error, url: &Url, options: &FetchOptions) -> FileKitError {
    if err.is_timeout() && err.is_connect() {
        FileKitError::ConnectTimeout {
            url: url.to_string(),
            timeout: options.connect_timeout.unwrap_or_default(),
        }
    } else if err.is_timeout() {
        FileKitError::ReadTimeout {
            url: url.to_string(),
            timeout: options.read_timeout.unwrap_or_default(),
        }
    } else {
        FileKitError::Http(err)
    }
}

fn write_body(mut reader: ChannelReader, destination: &Path, encoding: BodyEncoding) -> Result<u64> {
    let output = File::create(destination).map_err(io_at(destination))?;
    let cleanup = fsx::discard_on_failure(destination);
    let mut sink = BufWriter::new(output);
    let written = match encoding {
        BodyEncoding::Identity => copy_stream(&mut reader, &mut sink),
        BodyEncoding::Gzip => copy_stream(&mut MultiGzDecoder::new(reader), &mut sink),
    }
    .map_err(io_at(destination))?;
    sink.flush().map_err(io_at(destination))?;
    drop(sink);
    ScopeGuard::into_inner(cleanup);
    Ok(written)
}

/// Blocking [`Read`] over the frames the network task sends.
struct ChannelReader {
    rx: mpsc::Receiver<Frame>,
    pending: Bytes,
    ended: bool,
}

impl ChannelReader {
    fn new(rx: mpsc::Receiver<Frame>) -> Self {
        Self { rx, pending: Bytes::new(), ended: false }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.ended {
            return Ok(0);
        }
        while self.pending.is_empty() {
            match self.rx.blocking_recv() {
                Some(Frame::Chunk(chunk)) => self.pending = chunk,
                Some(Frame::End) => {
                    self.ended = true;
                    return Ok(0);
                }
                Some(Frame::Failed(e)) => return Err(e),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "transfer stopped before the body was complete",
                    ))
                }
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }
}
