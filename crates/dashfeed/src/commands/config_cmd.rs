//! Config subcommand handlers.

use dashfeed_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |_| config::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init {
            url,
            name,
            namespace,
            start_path,
            force,
        } => {
            url::Url::parse(&url).map_err(|e| CliError::Validation {
                field: "url".into(),
                reason: format!("invalid URL '{url}': {e}"),
            })?;

            let mut cfg: Config = config::load_config_or_default();
            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::ProfileExists { name });
            }

            let mut profile = Profile::new(url);
            profile.namespace = namespace;
            if let Some(start_path) = start_path {
                profile.start_path = start_path;
            }

            if cfg.profiles.is_empty() {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);
            dashfeed_config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!(
                    "✓ Profile '{name}' written to {}",
                    config::config_path().display()
                );
            }
            Ok(())
        }
    }
}
