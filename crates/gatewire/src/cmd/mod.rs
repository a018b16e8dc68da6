use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod commands;
pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a packet and write its wire bytes.
    Encode(EncodeArgs),
    /// Decode packets from a file or stdin and print their fields.
    Decode(DecodeArgs),
    /// Print the command vocabulary.
    Commands(CommandsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Commands(args) => commands::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command code or name (e.g. 3, on-message, SEND_TO_UID).
    #[arg(long, short = 'c')]
    pub cmd: String,
    /// Gateway listening address.
    #[arg(long, default_value = "0.0.0.0:0")]
    pub local_addr: std::net::SocketAddrV4,
    /// Client address as seen by the gateway.
    #[arg(long, default_value = "0.0.0.0:0")]
    pub client_addr: std::net::SocketAddrV4,
    /// Gateway-local connection id.
    #[arg(long, default_value = "0")]
    pub connection_id: u32,
    /// Externally advertised gateway port.
    #[arg(long, default_value = "0")]
    pub gateway_port: u16,
    /// Extension segment (uid, group id, ...).
    #[arg(long, default_value = "")]
    pub ext: String,
    /// JSON body (sent as a structured value).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw scalar body.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read a scalar body from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Ask the gateway to skip protocol encoding on fanout.
    #[arg(long)]
    pub no_call_encode: bool,
    /// Write the packet to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Print the packet as hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding packet bytes; omit or use `-` for stdin.
    pub input: Option<PathBuf>,
    /// Treat the input as hex text.
    #[arg(long)]
    pub hex: bool,
    /// Maximum accepted packet size in bytes.
    #[arg(long, default_value_t = gatewire_proto::DEFAULT_MAX_PACKET)]
    pub max_packet: usize,
}

#[derive(Args, Debug, Default)]
pub struct CommandsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
