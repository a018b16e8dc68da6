use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gatewire_proto::Cmd;
use serde::Serialize;

use crate::cmd::CommandsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CommandRow {
    code: u8,
    name: &'static str,
    direction: &'static str,
}

pub fn run(_args: CommandsArgs, format: OutputFormat) -> CliResult<i32> {
    let rows: Vec<CommandRow> = Cmd::ALL
        .into_iter()
        .map(|cmd| CommandRow {
            code: cmd as u8,
            name: cmd.name(),
            direction: if cmd.is_event() {
                "gateway->worker"
            } else {
                "worker->gateway"
            },
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        _ => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "NAME", "DIRECTION"]);
            for row in &rows {
                table.add_row(vec![
                    row.code.to_string(),
                    row.name.to_string(),
                    row.direction.to_string(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(SUCCESS)
}
