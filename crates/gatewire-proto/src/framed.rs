//! `tokio_util::codec` adapter for async transports.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_packet, read_packet, DEFAULT_MAX_PACKET};
use crate::error::ProtoError;
use crate::packet::Packet;

/// Packet codec for use with `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct GatewayCodec {
    max_packet_size: usize,
}

impl GatewayCodec {
    /// Create a codec with the default maximum packet size.
    pub fn new() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET,
        }
    }

    /// Create a codec with an explicit maximum packet size.
    pub fn with_max_packet_size(max_packet_size: usize) -> Self {
        Self { max_packet_size }
    }
}

impl Default for GatewayCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for GatewayCodec {
    type Item = Packet;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, Self::Error> {
        read_packet(src, self.max_packet_size)
    }
}

impl Encoder<Packet> for GatewayCodec {
    type Error = ProtoError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_packet(&packet, dst)
    }
}
