use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use triex_core::{Result, TrieXError};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 8;

/// Prepends the length header to `payload`.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u64(payload.len() as u64);
    buf.put_slice(payload);
    buf.freeze()
}

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer closes the stream cleanly between
/// frames. A close in the middle of a frame is an error, and so is a length
/// above `max_len`: the stream cannot be resynchronised after either.
pub async fn read_frame<R>(reader: &mut R, max_len: u64) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed inside frame header").into());
        }
        filled += n;
    }

    let len = u64::from_be_bytes(header);
    if len > max_len {
        return Err(TrieXError::FrameTooLarge { len, max: max_len });
    }

    let mut payload = BytesMut::zeroed(len as usize);
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload.freeze()))
}

/// Writes `payload` as a single frame and flushes.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_frame(payload)).await?;
    writer.flush().await?;
    Ok(())
}
