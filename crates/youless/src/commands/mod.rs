//! Command dispatch: bridges CLI args -> `Meter` operations -> output formatting.

pub mod config_cmd;
pub mod status;
pub mod usage;

use tokio_util::sync::CancellationToken;

use youless_core::Meter;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a meter-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    meter: &Meter,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(meter, global, cancel).await,
        Command::Usage(args) => usage::handle_window(meter, &args, global, cancel).await,
        Command::LastHour => usage::handle_last_hour(meter, global, cancel).await,
        Command::LastDay => usage::handle_last_day(meter, global, cancel).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
