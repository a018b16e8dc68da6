/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The buffer is shorter than the packet it claims to hold.
    #[error("packet truncated (need {needed} bytes, got {got})")]
    Truncated { needed: usize, got: usize },

    /// The leading length field disagrees with the buffer handed to the decoder.
    #[error("declared packet length {declared} does not match buffer length {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    /// The leading length field is smaller than the fixed header.
    #[error("declared packet length {declared} is shorter than the fixed header")]
    BadLength { declared: u32 },

    /// The packet exceeds the configured maximum size.
    #[error("packet too large ({size} bytes, max {max})")]
    PacketTooLarge { size: usize, max: usize },

    /// The extension segment does not fit its 16-bit length field.
    #[error("extension data too large ({size} bytes, max 65535)")]
    ExtTooLarge { size: usize },

    /// The command byte is not part of the protocol vocabulary.
    #[error("unknown command code {0}")]
    UnknownCmd(u8),

    /// A command name did not match any known command.
    #[error("unknown command name {0:?}")]
    UnknownCmdName(String),

    /// A structured body failed to serialize.
    #[error("body serialization failed: {0}")]
    BodyEncode(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete packet was received.
    #[error("connection closed (incomplete packet)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ProtoError>;
