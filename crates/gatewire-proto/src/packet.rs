//! The packet value object and its typed builder.

use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{Bytes, BytesMut};
use serde_json::Value;

use crate::codec::encode_packet;
use crate::command::{Cmd, FLAG_BODY_IS_SCALAR};
use crate::error::{ProtoError, Result};

/// Packet body payload.
///
/// The scalar flag bit selects the variant on the wire: a `Scalar` body is
/// carried verbatim, a `Value` body is JSON text the receiver deserializes.
/// `Absent` is what a decoder yields when a non-scalar body fails to parse;
/// it means "could not interpret", not "peer sent nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Raw bytes, used as-is by the receiver.
    Scalar(Bytes),
    /// A structured value, JSON-encoded on the wire.
    Value(Value),
    /// A non-scalar body that could not be deserialized.
    Absent,
}

impl Body {
    /// An empty scalar body.
    pub fn empty() -> Self {
        Body::Scalar(Bytes::new())
    }

    /// The raw bytes of a scalar body, if this is one.
    pub fn as_scalar(&self) -> Option<&Bytes> {
        match self {
            Body::Scalar(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The structured value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Body::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Body::Absent)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Value(value)
    }
}

/// One protocol packet.
///
/// A transient, immutable value: it exists for a single encode or decode
/// call and holds no resources. The length fields (`pack_len`, `ext_len`)
/// are derived during encoding and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// Operation code.
    pub cmd: Cmd,
    /// Gateway's own listening address, as a host-order IPv4 integer.
    pub local_ip: u32,
    pub local_port: u16,
    /// Remote peer's address as seen by the gateway.
    pub client_ip: u32,
    pub client_port: u16,
    /// Gateway-local connection identifier. Opaque to the codec.
    pub connection_id: u32,
    /// Flag bitset. The scalar bit is recomputed from `body` on encode;
    /// other bits are carried as given.
    pub flag: u8,
    /// The gateway's externally advertised port.
    pub gateway_port: u16,
    /// Variable-length extension segment (uid, group id, session blob).
    pub ext_data: Bytes,
    pub body: Body,
}

impl Packet {
    /// Start building a packet for the given command.
    pub fn builder(cmd: Cmd) -> PacketBuilder {
        PacketBuilder::new(cmd)
    }

    /// Encode this packet into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        encode_packet(self, &mut buf)?;
        Ok(buf.freeze())
    }

    /// The gateway's listening address as a socket address.
    pub fn local_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::from(self.local_ip), self.local_port)
    }

    /// The client's address as a socket address.
    pub fn client_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::from(self.client_ip), self.client_port)
    }

    /// Whether the scalar flag bit is set.
    pub fn body_is_scalar(&self) -> bool {
        self.flag & FLAG_BODY_IS_SCALAR != 0
    }
}

/// Builds a [`Packet`] field by field.
///
/// Field widths do the range validation the wire format needs: ports are
/// `u16` by type, addresses `u32`. The one check left for [`build`] is that
/// the extension segment fits its 16-bit length field.
///
/// [`build`]: PacketBuilder::build
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    cmd: Cmd,
    local_ip: u32,
    local_port: u16,
    client_ip: u32,
    client_port: u16,
    connection_id: u32,
    flag: u8,
    gateway_port: u16,
    ext_data: Bytes,
    body: Body,
}

impl PacketBuilder {
    pub fn new(cmd: Cmd) -> Self {
        Self {
            cmd,
            local_ip: 0,
            local_port: 0,
            client_ip: 0,
            client_port: 0,
            connection_id: 0,
            flag: 0,
            gateway_port: 0,
            ext_data: Bytes::new(),
            body: Body::empty(),
        }
    }

    pub fn local_addr(mut self, addr: SocketAddrV4) -> Self {
        self.local_ip = u32::from(*addr.ip());
        self.local_port = addr.port();
        self
    }

    pub fn client_addr(mut self, addr: SocketAddrV4) -> Self {
        self.client_ip = u32::from(*addr.ip());
        self.client_port = addr.port();
        self
    }

    pub fn connection_id(mut self, id: u32) -> Self {
        self.connection_id = id;
        self
    }

    /// Set extra flag bits (e.g. [`FLAG_NOT_CALL_ENCODE`]). The scalar bit
    /// is derived from the body during encoding.
    ///
    /// [`FLAG_NOT_CALL_ENCODE`]: crate::command::FLAG_NOT_CALL_ENCODE
    pub fn flag(mut self, flag: u8) -> Self {
        self.flag = flag;
        self
    }

    pub fn gateway_port(mut self, port: u16) -> Self {
        self.gateway_port = port;
        self
    }

    pub fn ext_data(mut self, ext: impl Into<Bytes>) -> Self {
        self.ext_data = ext.into();
        self
    }

    /// Set a scalar body, carried verbatim.
    pub fn body_scalar(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Body::Scalar(body.into());
        self
    }

    /// Set a structured body, JSON-encoded on the wire.
    pub fn body_value(mut self, value: Value) -> Self {
        self.body = Body::Value(value);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Packet> {
        if self.ext_data.len() > u16::MAX as usize {
            return Err(ProtoError::ExtTooLarge {
                size: self.ext_data.len(),
            });
        }
        Ok(Packet {
            cmd: self.cmd,
            local_ip: self.local_ip,
            local_port: self.local_port,
            client_ip: self.client_ip,
            client_port: self.client_port,
            connection_id: self.connection_id,
            flag: self.flag,
            gateway_port: self.gateway_port,
            ext_data: self.ext_data,
            body: self.body,
        })
    }
}
