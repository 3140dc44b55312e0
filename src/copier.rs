//! Chunked byte copying between a reader and a writer.
//!
//! Every archive, compression and fetch path funnels its bytes through [`copy_stream`].

use std::io::{self, Read, Write};

use crate::common::TRANSFER_BUFFER_SIZE;

/// Copies everything `source` yields into `sink` and returns the number of bytes copied.
///
/// Each call owns a fresh `TRANSFER_BUFFER_SIZE` buffer, refilled on every cycle. Exactly
/// the bytes returned by each read are written. Neither stream is closed or flushed; the
/// caller scopes their lifetime.
pub fn copy_stream<R, W>(source: &mut R, sink: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; TRANSFER_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let len = match source.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buf[..len])?;
        total += len as u64;
    }
}
