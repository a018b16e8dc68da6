//! Gateway/worker push-messaging protocol toolkit.
//!
//! gatewire implements the binary packet protocol spoken between a
//! connection-holding gateway and stateless worker processes, plus a CLI
//! for encoding and inspecting packets.
//!
//! # Crate Structure
//!
//! - [`proto`] — packet codec, command vocabulary, framing, stream adapters

/// Re-export protocol types.
pub mod proto {
    pub use gatewire_proto::*;
}
