//! Usage history commands.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use youless_core::{CoreError, Meter, UsageBlock, UsageWindow};

use crate::cli::{GlobalOpts, UsageArgs};
use crate::error::CliError;
use crate::output;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Tabled)]
struct MeasurementRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Value")]
    value: i64,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

fn detail(block: &UsageBlock) -> String {
    let unit = block.unit().symbol();
    let rows: Vec<MeasurementRow> = block
        .measurements()
        .iter()
        .map(|m| MeasurementRow {
            time: m.timestamp.format(TIME_FORMAT).to_string(),
            value: m.value,
            unit,
        })
        .collect();

    format!(
        "{} readings from {} every {}s\n{}",
        block.len(),
        block.start().format(TIME_FORMAT),
        block.interval_secs(),
        output::render_table(&rows)
    )
}

fn plain(block: &UsageBlock) -> String {
    block
        .measurements()
        .iter()
        .map(|m| format!("{}\t{}", m.timestamp.format("%Y-%m-%dT%H:%M:%S"), m.value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_block(block: &UsageBlock, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, block, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_window(
    meter: &Meter,
    args: &UsageArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let window = UsageWindow::new(args.window.into(), args.index).map_err(CoreError::from)?;
    let block = meter.usage(window, cancel).await?;
    print_block(&block, global)
}

pub async fn handle_last_hour(
    meter: &Meter,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let block = meter.last_hour(cancel).await?;
    print_block(&block, global)
}

pub async fn handle_last_day(
    meter: &Meter,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let block = meter.last_day(cancel).await?;
    print_block(&block, global)
}
