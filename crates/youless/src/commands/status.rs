//! Live status command.

use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;

use youless_core::{ConnectionStatus, Meter, Status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn optional(value: Option<i64>, suffix: &str) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v}{suffix}"))
}

fn detail(status: &Status, color: bool) -> String {
    let connection = status.connection.to_string();
    let connection = match (color, status.connection) {
        (false, _) => connection,
        (true, ConnectionStatus::Success) => connection.green().to_string(),
        (true, ConnectionStatus::Failure) => connection.red().to_string(),
        (true, ConnectionStatus::Unknown) => connection.yellow().to_string(),
    };

    [
        format!("Power:        {} W", status.power_watts),
        format!("Meter total:  {:.3} kWh", status.total_kwh),
        format!("Connection:   {connection}"),
        format!("Level:        {}", optional(status.level, "")),
        format!("Deviation:    {}", optional(status.deviation_percent, "%")),
        format!("Next upload:  {}", optional(status.next_update_secs, "s")),
    ]
    .join("\n")
}

pub async fn handle(
    meter: &Meter,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let status = meter.status(cancel).await?;
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &status,
        |s| detail(s, color),
        |s| s.power_watts.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
