//! Packet encoding and decoding.
//!
//! Wire format, all integers big-endian:
//! ```text
//! ┌──────────┬─────┬──────────┬────────┬──────────┬────────┬─────────┬──────┬─────────┬─────────┬─────┬──────┐
//! │ pack_len │ cmd │ local_ip │ l_port │ client_ip│ c_port │ conn_id │ flag │ gw_port │ ext_len │ ext │ body │
//! │ 4B       │ 1B  │ 4B       │ 2B     │ 4B       │ 2B     │ 4B      │ 1B   │ 2B      │ 2B (N)  │ N B │ rest │
//! └──────────┴─────┴──────────┴────────┴──────────┴────────┴─────────┴──────┴─────────┴─────────┴─────┴──────┘
//! ```
//! `pack_len` is the total packet length, header included. The scalar flag
//! bit (`0x01`) selects whether the body is raw bytes or JSON text.
//!
//! All functions here are pure and stateless. Decoding never indexes past a
//! length it has checked and never panics on hostile input.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::{Cmd, FLAG_BODY_IS_SCALAR};
use crate::error::{ProtoError, Result};
use crate::packet::{Body, Packet};

/// Fixed header size: len (4) + cmd (1) + local addr (6) + client addr (6)
/// + connection id (4) + flag (1) + gateway port (2) + ext len (2) = 26.
pub const HEADER_SIZE: usize = 26;

/// Default maximum packet size: 16 MiB.
pub const DEFAULT_MAX_PACKET: usize = 16 * 1024 * 1024;

/// Configuration for the streaming packet layer.
#[derive(Debug, Clone)]
pub struct ProtoConfig {
    /// Maximum total packet size in bytes. Default: 16 MiB.
    pub max_packet_size: usize,
}

impl Default for ProtoConfig {
    fn default() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET,
        }
    }
}

/// The framer: peek at an accumulation buffer and report the declared total
/// length of the packet it starts with, or `0` until the fixed header has
/// arrived.
///
/// Purely a peek; nothing past the length field is interpreted, and bytes
/// trailing the packet (the start of the next one) are ignored. The caller
/// slices exactly the reported number of bytes once the buffer holds them.
pub fn input(buffer: &[u8]) -> u32 {
    if buffer.len() < HEADER_SIZE {
        return 0;
    }
    u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]])
}

/// Encode one packet into `dst`.
///
/// The scalar flag bit is derived from the body variant: set for `Scalar`
/// (and `Absent`, which encodes as an empty scalar), clear for `Value` so
/// the peer knows to deserialize. Other flag bits pass through unchanged.
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) -> Result<()> {
    let (body, flag) = match &packet.body {
        Body::Scalar(bytes) => (bytes.clone(), packet.flag | FLAG_BODY_IS_SCALAR),
        Body::Value(value) => (
            Bytes::from(serde_json::to_vec(value)?),
            packet.flag & !FLAG_BODY_IS_SCALAR,
        ),
        Body::Absent => (Bytes::new(), packet.flag | FLAG_BODY_IS_SCALAR),
    };

    let ext_len = packet.ext_data.len();
    if ext_len > u16::MAX as usize {
        return Err(ProtoError::ExtTooLarge { size: ext_len });
    }
    let pack_len = HEADER_SIZE + ext_len + body.len();
    if pack_len > u32::MAX as usize {
        return Err(ProtoError::PacketTooLarge {
            size: pack_len,
            max: u32::MAX as usize,
        });
    }

    dst.reserve(pack_len);
    dst.put_u32(pack_len as u32);
    dst.put_u8(packet.cmd as u8);
    dst.put_u32(packet.local_ip);
    dst.put_u16(packet.local_port);
    dst.put_u32(packet.client_ip);
    dst.put_u16(packet.client_port);
    dst.put_u32(packet.connection_id);
    dst.put_u8(flag);
    dst.put_u16(packet.gateway_port);
    dst.put_u16(ext_len as u16);
    dst.put_slice(&packet.ext_data);
    dst.put_slice(&body);
    Ok(())
}

/// Decode exactly one complete packet.
///
/// The buffer must be precisely the slice the framer reported; the leading
/// length field is checked against it. A non-scalar body that fails JSON
/// deserialization yields [`Body::Absent`] rather than an error, since the
/// header fields remain valid.
pub fn decode_packet(buffer: &[u8]) -> Result<Packet> {
    if buffer.len() < HEADER_SIZE {
        return Err(ProtoError::Truncated {
            needed: HEADER_SIZE,
            got: buffer.len(),
        });
    }

    let mut rd = buffer;
    let pack_len = rd.get_u32();
    if pack_len as usize != buffer.len() {
        return Err(ProtoError::LengthMismatch {
            declared: pack_len,
            actual: buffer.len(),
        });
    }

    let cmd = Cmd::try_from(rd.get_u8())?;
    let local_ip = rd.get_u32();
    let local_port = rd.get_u16();
    let client_ip = rd.get_u32();
    let client_port = rd.get_u16();
    let connection_id = rd.get_u32();
    let flag = rd.get_u8();
    let gateway_port = rd.get_u16();
    let ext_len = rd.get_u16() as usize;

    if ext_len > rd.remaining() {
        return Err(ProtoError::Truncated {
            needed: HEADER_SIZE + ext_len,
            got: buffer.len(),
        });
    }
    let ext_data = rd.copy_to_bytes(ext_len);
    let body_bytes = rd.copy_to_bytes(rd.remaining());

    let body = if flag & FLAG_BODY_IS_SCALAR != 0 {
        Body::Scalar(body_bytes)
    } else {
        match serde_json::from_slice(&body_bytes) {
            Ok(value) => Body::Value(value),
            Err(err) => {
                tracing::debug!(
                    cmd = cmd.name(),
                    body_len = body_bytes.len(),
                    %err,
                    "non-scalar body is not valid JSON, yielding absent body"
                );
                Body::Absent
            }
        }
    };

    Ok(Packet {
        cmd,
        local_ip,
        local_port,
        client_ip,
        client_port,
        connection_id,
        flag,
        gateway_port,
        ext_data,
        body,
    })
}

/// Decode a packet from an accumulation buffer.
///
/// Returns `Ok(None)` while the buffer does not yet hold a complete packet.
/// On success, consumes exactly the packet's bytes and leaves any remainder
/// (the start of the next packet) in place.
pub fn read_packet(src: &mut BytesMut, max_packet: usize) -> Result<Option<Packet>> {
    let pack_len = input(src) as usize;
    if pack_len == 0 {
        return Ok(None); // Need more data
    }
    if pack_len < HEADER_SIZE {
        return Err(ProtoError::BadLength {
            declared: pack_len as u32,
        });
    }
    if pack_len > max_packet {
        return Err(ProtoError::PacketTooLarge {
            size: pack_len,
            max: max_packet,
        });
    }
    if src.len() < pack_len {
        return Ok(None); // Need more data
    }

    let packet = decode_packet(&src[..pack_len])?;
    src.advance(pack_len);
    Ok(Some(packet))
}
