// ── Domain model ──
//
// Validated values produced from the device's raw wire records. Consumers
// (the CLI, library users) depend on these types only.

pub mod status;
pub mod usage;

pub use status::{ConnectionStatus, Status};
pub use usage::{Measurement, UsageBlock, UsageUnit};
