use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{read_packet, ProtoConfig};
use crate::error::{ProtoError, Result};
use crate::packet::Packet;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete packets from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete packets.
/// The stream itself (socket setup, timeouts, reconnects) stays with the
/// caller; this type only owns the accumulation buffer.
pub struct PacketReader<T> {
    inner: T,
    buf: BytesMut,
    config: ProtoConfig,
}

impl<T: Read> PacketReader<T> {
    /// Create a new packet reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ProtoConfig::default())
    }

    /// Create a new packet reader with explicit configuration.
    pub fn with_config(inner: T, config: ProtoConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete packet (blocking).
    ///
    /// Returns `Err(ProtoError::ConnectionClosed)` when EOF is reached.
    pub fn read_packet(&mut self) -> Result<Packet> {
        loop {
            if let Some(packet) = read_packet(&mut self.buf, self.config.max_packet_size)? {
                return Ok(packet);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            };

            if read == 0 {
                return Err(ProtoError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum packet size for subsequent decoding.
    pub fn set_max_packet_size(&mut self, max_packet_size: usize) {
        self.config.max_packet_size = max_packet_size;
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ProtoConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::encode_packet;
    use crate::command::Cmd;

    fn event_packet(connection_id: u32, body: &'static str) -> Packet {
        Packet::builder(Cmd::OnMessage)
            .connection_id(connection_id)
            .body_scalar(body)
            .build()
            .unwrap()
    }

    #[test]
    fn read_single_packet() {
        let mut wire = BytesMut::new();
        encode_packet(&event_packet(1, "hello"), &mut wire).unwrap();

        let mut reader = PacketReader::new(Cursor::new(wire.to_vec()));
        let packet = reader.read_packet().unwrap();

        assert_eq!(packet.connection_id, 1);
        assert_eq!(packet.body.as_scalar().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_packets() {
        let mut wire = BytesMut::new();
        encode_packet(&event_packet(1, "one"), &mut wire).unwrap();
        encode_packet(&event_packet(2, "two"), &mut wire).unwrap();
        encode_packet(&event_packet(3, "three"), &mut wire).unwrap();

        let mut reader = PacketReader::new(Cursor::new(wire.to_vec()));

        for (id, body) in [(1u32, "one"), (2, "two"), (3, "three")] {
            let packet = reader.read_packet().unwrap();
            assert_eq!(packet.connection_id, id);
            assert_eq!(packet.body.as_scalar().unwrap().as_ref(), body.as_bytes());
        }
    }

    #[test]
    fn read_packet_with_large_body() {
        let body = vec![0xAB; 64 * 1024];
        let mut wire = BytesMut::new();
        let packet = Packet::builder(Cmd::SendToAll)
            .body_scalar(body.clone())
            .build()
            .unwrap();
        encode_packet(&packet, &mut wire).unwrap();

        let mut reader = PacketReader::new(Cursor::new(wire.to_vec()));
        let decoded = reader.read_packet().unwrap();

        assert_eq!(decoded.body.as_scalar().unwrap().as_ref(), body.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let mut wire = BytesMut::new();
        encode_packet(&event_packet(4, "slow"), &mut wire).unwrap();

        let byte_reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = PacketReader::new(byte_reader);

        let packet = reader.read_packet().unwrap();
        assert_eq!(packet.connection_id, 4);
        assert_eq!(packet.body.as_scalar().unwrap().as_ref(), b"slow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = PacketReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_packet().unwrap_err();
        assert!(matches!(err, ProtoError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_packet() {
        let mut wire = BytesMut::new();
        encode_packet(&event_packet(5, "cut short"), &mut wire).unwrap();
        wire.truncate(wire.len() - 4);

        let mut reader = PacketReader::new(Cursor::new(wire.to_vec()));
        let err = reader.read_packet().unwrap_err();
        assert!(matches!(err, ProtoError::ConnectionClosed));
    }

    #[test]
    fn oversized_packet_in_stream() {
        let mut wire = BytesMut::new();
        wire.put_u32(1024);
        wire.extend_from_slice(&[0u8; 64]);

        let cfg = ProtoConfig {
            max_packet_size: 128,
        };
        let mut reader = PacketReader::with_config(Cursor::new(wire.to_vec()), cfg);
        let err = reader.read_packet().unwrap_err();
        assert!(matches!(err, ProtoError::PacketTooLarge { .. }));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::PacketWriter::new(left);
        let mut reader = PacketReader::new(right);

        writer.send(&event_packet(9, "ping")).unwrap();
        let packet = reader.read_packet().unwrap();

        assert_eq!(packet.connection_id, 9);
        assert_eq!(packet.body.as_scalar().unwrap().as_ref(), b"ping");
    }

    #[test]
    fn interrupted_read_retries() {
        let mut wire = BytesMut::new();
        encode_packet(&event_packet(8, "ok"), &mut wire).unwrap();

        let inner = InterruptedThenData {
            interrupted: false,
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = PacketReader::new(inner);
        let packet = reader.read_packet().unwrap();

        assert_eq!(packet.connection_id, 8);
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let inner = WouldBlockReader;
        let mut reader = PacketReader::new(inner);
        let err = reader.read_packet().unwrap_err();
        assert!(matches!(err, ProtoError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    struct WouldBlockReader;

    impl Read for WouldBlockReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = PacketReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        reader.set_max_packet_size(1024);
        assert_eq!(reader.config().max_packet_size, 1024);
        let _inner = reader.into_inner();
    }
}
