//! Length-prefixed JSON framing shared by the single-instance and hotkey
//! broker sockets.
//!
//! Every frame carries a 4-byte little-endian opcode, a 4-byte little-endian
//! payload length and a UTF-8 JSON payload. The opcode namespaces are local
//! to each socket; this module only deals with the envelope.

use std::env;
use std::io::Cursor;
use std::path::PathBuf;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame payload. Anything larger is treated as a
/// protocol violation rather than buffered.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

/// Resolve the base directory for runtime sockets.
///
/// Prefers `$XDG_RUNTIME_DIR`, falling back to `/tmp` when unset.
pub fn default_runtime_dir() -> PathBuf {
    env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Packs the opcode, payload length and JSON payload into a byte vector.
pub fn frame_message(opcode: u32, payload_json: &str) -> std::io::Result<Vec<u8>> {
    let payload_bytes = payload_json.as_bytes();
    let payload_len = payload_bytes.len() as u32;
    if payload_len > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("frame payload of {payload_len} bytes exceeds the {MAX_FRAME_LEN} byte limit"),
        ));
    }

    let mut frame = Vec::with_capacity(8 + payload_bytes.len());
    WriteBytesExt::write_u32::<LittleEndian>(&mut frame, opcode)?;
    WriteBytesExt::write_u32::<LittleEndian>(&mut frame, payload_len)?;
    std::io::Write::write_all(&mut frame, payload_bytes)?;

    Ok(frame)
}

/// Frames `payload_json` under `opcode` and writes it to `writer`.
pub async fn write_frame<W>(writer: &mut W, opcode: u32, payload_json: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = frame_message(opcode, payload_json)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Reads one framed message from `reader`, returning the opcode and the JSON
/// payload string. An empty payload (length 0) yields an empty string.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<(u32, String)>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; 8];
    reader.read_exact(&mut header_buf).await?;

    let mut cursor = Cursor::new(header_buf);
    let opcode = ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?;
    let length = ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?;

    if length == 0 {
        return Ok((opcode, String::new()));
    }
    if length > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame announces {length} bytes, above the {MAX_FRAME_LEN} byte limit"),
        ));
    }

    let mut payload_buf = vec![0u8; length as usize];
    reader.read_exact(&mut payload_buf).await?;

    let payload = String::from_utf8(payload_buf).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame payload is not valid UTF-8: {e}"),
        )
    })?;

    Ok((opcode, payload))
}
