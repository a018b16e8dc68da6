use std::fs;
use std::io::Read;
use std::path::Path;

use bytes::BytesMut;
use gatewire_proto::read_packet;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, proto_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{parse_hex, print_packet, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(args.input.as_deref())?;
    let data = if args.hex {
        let text = String::from_utf8(raw)
            .map_err(|_| CliError::new(DATA_INVALID, "--hex input is not valid UTF-8"))?;
        parse_hex(&text)?
    } else {
        raw
    };

    let mut buf = BytesMut::from(data.as_slice());
    let mut decoded = 0usize;

    while !buf.is_empty() {
        match read_packet(&mut buf, args.max_packet) {
            Ok(Some(packet)) => {
                print_packet(&packet, format);
                decoded += 1;
            }
            Ok(None) => {
                return Err(CliError::new(
                    DATA_INVALID,
                    format!("trailing {} bytes are not a complete packet", buf.len()),
                ));
            }
            Err(err) => return Err(proto_error("decode failed", err)),
        }
    }

    if decoded == 0 {
        return Err(CliError::new(DATA_INVALID, "input holds no packets"));
    }

    tracing::debug!(packets = decoded, "decoded input");
    Ok(SUCCESS)
}

fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
        }
        _ => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(data)
        }
    }
}
