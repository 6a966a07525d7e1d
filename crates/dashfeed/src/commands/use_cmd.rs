//! `dashfeed use <namespace>`: switch the backend's active namespace.

use dashfeed_core::{Backend, CoreError, HttpBackend};

use crate::cli::{GlobalOpts, UseArgs};
use crate::config::Target;
use crate::error::CliError;

pub async fn handle(args: UseArgs, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    if args.namespace.is_empty() {
        return Err(CliError::Validation {
            field: "namespace".into(),
            reason: "cannot be empty".into(),
        });
    }

    let backend = HttpBackend::connect(&target.controller)?;
    backend
        .activate_namespace(&args.namespace)
        .await
        .map_err(|e| match e {
            CoreError::Api { message, .. } => CliError::NamespaceRejected {
                namespace: args.namespace.clone(),
                reason: message,
            },
            other => other.into(),
        })?;

    if !global.quiet {
        eprintln!("✓ Active namespace set to '{}'", args.namespace);
    }
    Ok(())
}
