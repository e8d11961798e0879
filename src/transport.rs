//! Newline-delimited JSON framing shared by the server and the client.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{LockitError, Result};

/// Bytes allowed in a frame on top of the base64-encoded payload, for
/// the JSON envelope and the password field.
const ENVELOPE_SLACK: usize = 16 * 1024;

/// Largest frame that can carry a payload of `max_payload_bytes`.
pub fn frame_limit(max_payload_bytes: usize) -> usize {
    max_payload_bytes.div_ceil(3) * 4 + ENVELOPE_SLACK
}

/// Read one frame, without its trailing newline.
///
/// Returns `Ok(None)` on a clean end of stream.  A frame longer than
/// `max_len` is a `Validation` error; the stream is then out of sync and
/// should be closed.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut frame = Vec::new();
    let limit = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
    let read = reader.take(limit).read_until(b'\n', &mut frame).await?;
    if read == 0 {
        return Ok(None);
    }

    if frame.last() == Some(&b'\n') {
        frame.pop();
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
    } else if frame.len() > max_len {
        return Err(LockitError::Validation(format!(
            "request exceeds {max_len} bytes"
        )));
    }

    Ok(Some(frame))
}

/// Read and decode one JSON frame.
pub async fn read_message<R, T>(reader: &mut R, max_len: usize) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    match read_frame(reader, max_len).await? {
        Some(frame) => Ok(Some(serde_json::from_slice(&frame)?)),
        None => Ok(None),
    }
}

/// Encode `message` as one JSON line and flush it.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut frame = serde_json::to_vec(message)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
