use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gatewire_proto::{Body, Packet};
use serde::Serialize;

use crate::exit::{CliError, USAGE};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    cmd: u8,
    cmd_name: &'a str,
    direction: &'a str,
    local_addr: String,
    client_addr: String,
    connection_id: u32,
    flag: u8,
    gateway_port: u16,
    ext_len: usize,
    ext_data: String,
    body_kind: &'a str,
    body: serde_json::Value,
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                cmd: packet.cmd as u8,
                cmd_name: packet.cmd.name(),
                direction: direction(packet),
                local_addr: packet.local_addr().to_string(),
                client_addr: packet.client_addr().to_string(),
                connection_id: packet.connection_id,
                flag: packet.flag,
                gateway_port: packet.gateway_port,
                ext_len: packet.ext_data.len(),
                ext_data: bytes_preview(packet.ext_data.as_ref()),
                body_kind: body_kind(&packet.body),
                body: body_json(&packet.body),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec![
                    "cmd".to_string(),
                    format!("{} ({})", packet.cmd as u8, packet.cmd.name()),
                ])
                .add_row(vec!["direction".to_string(), direction(packet).to_string()])
                .add_row(vec![
                    "local_addr".to_string(),
                    packet.local_addr().to_string(),
                ])
                .add_row(vec![
                    "client_addr".to_string(),
                    packet.client_addr().to_string(),
                ])
                .add_row(vec![
                    "connection_id".to_string(),
                    packet.connection_id.to_string(),
                ])
                .add_row(vec!["flag".to_string(), format!("0x{:02x}", packet.flag)])
                .add_row(vec![
                    "gateway_port".to_string(),
                    packet.gateway_port.to_string(),
                ])
                .add_row(vec![
                    "ext_data".to_string(),
                    bytes_preview(packet.ext_data.as_ref()),
                ])
                .add_row(vec![
                    format!("body ({})", body_kind(&packet.body)),
                    body_preview(&packet.body),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "cmd={} ({}) conn={} client={} flag=0x{:02x} ext={} body[{}]={}",
                packet.cmd as u8,
                packet.cmd.name(),
                packet.connection_id,
                packet.client_addr(),
                packet.flag,
                bytes_preview(packet.ext_data.as_ref()),
                body_kind(&packet.body),
                body_preview(&packet.body)
            );
        }
        OutputFormat::Raw => match &packet.body {
            Body::Scalar(bytes) => print_raw(bytes.as_ref()),
            Body::Value(value) => println!("{value}"),
            Body::Absent => {}
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn direction(packet: &Packet) -> &'static str {
    if packet.cmd.is_event() {
        "gateway->worker"
    } else {
        "worker->gateway"
    }
}

fn body_kind(body: &Body) -> &'static str {
    match body {
        Body::Scalar(_) => "scalar",
        Body::Value(_) => "value",
        Body::Absent => "absent",
    }
}

fn body_json(body: &Body) -> serde_json::Value {
    match body {
        Body::Scalar(bytes) => serde_json::Value::String(bytes_preview(bytes.as_ref())),
        Body::Value(value) => value.clone(),
        Body::Absent => serde_json::Value::Null,
    }
}

fn body_preview(body: &Body) -> String {
    match body {
        Body::Scalar(bytes) => bytes_preview(bytes.as_ref()),
        Body::Value(value) => value.to_string(),
        Body::Absent => "<absent>".to_string(),
    }
}

fn bytes_preview(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", data.len()),
    }
}

pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

pub fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let mut digits = Vec::with_capacity(input.len() / 2);
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| CliError::new(USAGE, format!("invalid hex character {c:?}")))?;
        digits.push(digit as u8);
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex input has an odd number of digits"));
    }
    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}
