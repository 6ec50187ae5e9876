//! Wire format of the `Hc` socket protocol
//!
//! Commands travel as fixed 32-byte frames holding a NUL-terminated ASCII
//! string. Vectors are raw native-endian `f64`s without any header; both ends
//! already agree on their length.

use std::io::{self, ErrorKind, Read, Write};

pub const COMMAND_FRAME: usize = 32;

pub const ACK: &[u8; 3] = b"ACK";

/// Read one command frame. `Ok(None)` means the peer closed the connection.
pub fn read_command<R: Read>(reader: &mut R) -> io::Result<Option<String>> {
    let mut frame = [0u8; COMMAND_FRAME];
    match reader.read_exact(&mut frame) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let end = frame.iter().position(|&b| b == 0).unwrap_or(COMMAND_FRAME);
    Ok(Some(String::from_utf8_lossy(&frame[..end]).into_owned()))
}

/// Encode `command` into a frame. Anything past 31 bytes is dropped so the
/// frame always ends with a NUL.
pub fn encode_command(command: &str) -> [u8; COMMAND_FRAME] {
    let mut frame = [0u8; COMMAND_FRAME];
    let bytes = command.as_bytes();
    let len = bytes.len().min(COMMAND_FRAME - 1);
    frame[..len].copy_from_slice(&bytes[..len]);
    frame
}

pub fn write_command<W: Write>(writer: &mut W, command: &str) -> io::Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()
}

/// Fill `values` from exactly `8 * values.len()` bytes.
pub fn read_f64s<R: Read>(reader: &mut R, values: &mut [f64]) -> io::Result<()> {
    let mut bytes = vec![0u8; values.len() * 8];
    reader.read_exact(&mut bytes)?;
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(chunk);
        *value = f64::from_ne_bytes(raw);
    }
    Ok(())
}

pub fn write_f64s<W: Write>(writer: &mut W, values: &[f64]) -> io::Result<()> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    writer.write_all(&bytes)?;
    writer.flush()
}

pub fn read_ack<R: Read>(reader: &mut R) -> io::Result<()> {
    let mut ack = [0u8; 3];
    reader.read_exact(&mut ack)?;
    if &ack != ACK {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("expected ACK, got {:?}", ack),
        ));
    }
    Ok(())
}
