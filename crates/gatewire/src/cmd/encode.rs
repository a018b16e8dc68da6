use std::fs;

use bytes::Bytes;
use gatewire_proto::{Body, Cmd, Packet, FLAG_NOT_CALL_ENCODE};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, proto_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_raw, to_hex};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let cmd: Cmd = args
        .cmd
        .parse()
        .map_err(|err| CliError::new(USAGE, format!("--cmd: {err}")))?;

    let body = resolve_body(&args)?;
    let flag = if args.no_call_encode {
        FLAG_NOT_CALL_ENCODE
    } else {
        0
    };

    let packet = Packet::builder(cmd)
        .local_addr(args.local_addr)
        .client_addr(args.client_addr)
        .connection_id(args.connection_id)
        .gateway_port(args.gateway_port)
        .ext_data(Bytes::from(args.ext.clone()))
        .flag(flag)
        .body(body)
        .build()
        .map_err(|err| proto_error("packet build failed", err))?;

    let wire = packet
        .to_bytes()
        .map_err(|err| proto_error("packet encode failed", err))?;

    tracing::debug!(cmd = cmd.name(), len = wire.len(), "encoded packet");

    if let Some(path) = &args.out {
        fs::write(path, &wire)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
    } else if args.hex {
        println!("{}", to_hex(&wire));
    } else {
        print_raw(&wire);
    }

    Ok(SUCCESS)
}

fn resolve_body(args: &EncodeArgs) -> CliResult<Body> {
    if let Some(json) = &args.json {
        let value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(Body::Value(value));
    }
    if let Some(data) = &args.data {
        return Ok(Body::Scalar(Bytes::from(data.clone())));
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return Ok(Body::Scalar(Bytes::from(bytes)));
    }
    Ok(Body::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::EncodeArgs;

    fn base_args() -> EncodeArgs {
        EncodeArgs {
            cmd: "on-message".to_string(),
            local_addr: "0.0.0.0:0".parse().unwrap(),
            client_addr: "0.0.0.0:0".parse().unwrap(),
            connection_id: 0,
            gateway_port: 0,
            ext: String::new(),
            json: None,
            data: None,
            file: None,
            no_call_encode: false,
            out: None,
            hex: false,
        }
    }

    #[test]
    fn resolves_scalar_body() {
        let args = EncodeArgs {
            data: Some("hello".to_string()),
            ..base_args()
        };
        let body = resolve_body(&args).unwrap();
        assert_eq!(body.as_scalar().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn resolves_json_body() {
        let args = EncodeArgs {
            json: Some(r#"{"uid":"u1"}"#.to_string()),
            ..base_args()
        };
        let body = resolve_body(&args).unwrap();
        assert_eq!(body.as_value().unwrap()["uid"], "u1");
    }

    #[test]
    fn rejects_invalid_json_body() {
        let args = EncodeArgs {
            json: Some("{not json".to_string()),
            ..base_args()
        };
        let err = resolve_body(&args).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn defaults_to_empty_scalar_body() {
        let body = resolve_body(&base_args()).unwrap();
        assert_eq!(body, Body::empty());
    }
}
