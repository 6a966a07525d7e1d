//! CLI-side configuration: `GlobalOpts`-aware wrappers over
//! `dashfeed_config`.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use std::time::Duration;

use dashfeed_config::{Config, Profile};
use dashfeed_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dashfeed_config::{config_path, load_config_or_default};

/// Everything a command needs to talk to one backend.
#[derive(Debug)]
pub struct Target {
    pub controller: ControllerConfig,
    pub start_path: String,
    pub namespace: Option<String>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the target from the config file, profile, and CLI overrides.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // An explicitly named profile must exist
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
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
        // No profile found -- try to build from CLI flags / env vars alone
        None => {
            let api_base = global.api_base.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(api_base)
        }
    };

    let mut controller = dashfeed_config::profile_to_controller_config(
        &apply_overrides(profile.clone(), global),
        &cfg.defaults,
    )?;
    if global.insecure {
        controller.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        controller.timeout = Duration::from_secs(secs);
    }

    Ok(Target {
        controller,
        start_path: profile.start_path,
        namespace: profile.namespace,
    })
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref api_base) = global.api_base {
        profile.api_base.clone_from(api_base);
    }
    profile
}
