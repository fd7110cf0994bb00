//! CLI configuration, a thin wrapper around `youless_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --password, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use youless_core::MeterConfig;
use youless_core::config::DEFAULT_PORT;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use youless_config::{Config, config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `MeterConfig` from the config file, profile and CLI overrides.
///
/// Flags win over the profile. Without a matching profile the flags alone
/// must name a host.
pub fn build_meter_config(global: &GlobalOpts, config: &Config) -> Result<MeterConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let base = match config.profiles.get(&profile_name) {
        Some(profile) => Some(youless_config::profile_to_meter_config(
            profile,
            &profile_name,
            &config.defaults,
        )?),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => None,
    };

    let mut meter = match (base, global.host.as_deref()) {
        (Some(mut meter), Some(host)) => {
            host.clone_into(&mut meter.host);
            meter
        }
        (Some(meter), None) => meter,
        (None, Some(host)) => MeterConfig::new(host)
            .with_port(DEFAULT_PORT)
            .with_timeout(Duration::from_secs(config.defaults.timeout)),
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if meter.host.trim().is_empty() {
        return Err(CliError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    if let Some(port) = global.port {
        meter.port = port;
    }
    if let Some(secs) = global.timeout {
        meter.timeout = Duration::from_secs(secs);
    }
    if let Some(ref password) = global.password {
        meter.password = Some(SecretString::from(password.clone()));
    }

    Ok(meter)
}
