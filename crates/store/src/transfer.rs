//! Chunked byte transfer between a source stream and a sink.
//!
//! This is the single copy primitive used for all payload movement: writing
//! an uploaded multipart part or raw request body into a blob, and writing a
//! stored blob out to a response body.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Chunk size used when no explicit buffer size is requested.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Copy all bytes from `source` to `sink`, returning the number copied.
///
/// Reads up to `buffer_size` bytes at a time and writes exactly what was
/// read, until the source reports end-of-stream. On success the sink is
/// flushed and shut down. Any read or write error aborts the copy and
/// propagates to the caller; both handles are released on every exit path.
/// No transformation, retry, or integrity check is performed.
pub async fn copy<R, W>(source: &mut R, sink: &mut W, buffer_size: usize) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; buffer_size];
    let mut copied = 0u64;
    loop {
        let read = source.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        sink.write_all(&buffer[..read]).await?;
        copied += read as u64;
    }
    sink.shutdown().await?;
    Ok(copied)
}
