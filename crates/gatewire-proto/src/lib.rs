//! Binary packet codec for the gateway/worker push-messaging protocol.
//!
//! A connection-holding gateway forwards client events (connect, message,
//! close) to stateless workers; workers push control commands (send, kick,
//! bind-uid, group operations) back. This crate implements the wire format
//! both sides speak:
//! - A 26-byte fixed header with a leading 4-byte big-endian total length
//! - A variable-length extension segment (uid, group id, session blob)
//! - A body that is either raw bytes or a JSON value, selected by a flag bit
//!
//! Framing ([`input`]) and the codec ([`encode_packet`] / [`decode_packet`])
//! are pure functions over byte buffers; transport I/O and command dispatch
//! live with the caller. [`PacketReader`] and [`PacketWriter`] adapt the
//! codec to blocking `Read`/`Write` streams, and the `async` feature adds a
//! `tokio_util::codec` implementation.

pub mod codec;
pub mod command;
pub mod error;
pub mod packet;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod framed;

pub use codec::{
    decode_packet, encode_packet, input, read_packet, ProtoConfig, DEFAULT_MAX_PACKET, HEADER_SIZE,
};
pub use command::{Cmd, FLAG_BODY_IS_SCALAR, FLAG_NOT_CALL_ENCODE};
pub use error::{ProtoError, Result};
pub use packet::{Body, Packet, PacketBuilder};
pub use reader::PacketReader;
pub use writer::PacketWriter;

#[cfg(feature = "async")]
pub use framed::GatewayCodec;
