//! `dashfeed namespaces`: list what the backend can scope content to.

use serde::Serialize;
use tabled::Tabled;

use dashfeed_core::HttpBackend;

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct NamespaceEntry {
    value: String,
    label: String,
    active: bool,
}

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "NAMESPACE")]
    value: String,
    #[tabled(rename = "ACTIVE")]
    active: &'static str,
}

pub async fn handle(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let backend = HttpBackend::connect(&target.controller)?;
    let listing = backend.namespaces().await?;

    let entries: Vec<NamespaceEntry> = listing
        .options
        .into_iter()
        .map(|o| NamespaceEntry {
            active: o.value == listing.current,
            value: o.value,
            label: o.label,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| NamespaceRow {
            value: e.value.clone(),
            active: if e.active { "*" } else { "" },
        },
        |e| e.value.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
