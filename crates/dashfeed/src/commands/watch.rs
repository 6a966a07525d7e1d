//! `dashfeed watch`: run the synchronization controller and print every
//! view change until interrupted.

use tokio::sync::watch;
use tracing::{debug, info};

use dashfeed_core::{SwitchOutcome, SyncController, ViewSnapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, target: Target, global: &GlobalOpts) -> Result<(), CliError> {
    let path = args.path.unwrap_or(target.start_path);
    let controller = SyncController::connect(&target.controller, &path)?;

    if let Some(namespace) = args.namespace.or(target.namespace) {
        match controller.request_namespace(namespace).await? {
            SwitchOutcome::Failed { namespace, reason } => {
                controller.shutdown().await;
                return Err(CliError::NamespaceRejected { namespace, reason });
            }
            outcome => debug!(%outcome, "namespace request settled"),
        }
    }

    let result = follow(controller.subscribe(), args.once, global).await;
    controller.shutdown().await;
    result
}

async fn follow(
    mut updates: watch::Receiver<ViewSnapshot>,
    once: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    loop {
        let view = updates.borrow_and_update().clone();
        output::print_output(&render(&view, &global.output, color), global.quiet);

        if once && view.content.is_some() {
            return Ok(());
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Err(CliError::Stopped);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, closing feed");
                return Ok(());
            }
        }
    }
}

fn render(view: &ViewSnapshot, format: &OutputFormat, color: bool) -> String {
    output::render_single(
        format,
        view,
        |v| detail(v, color),
        |v| {
            v.content
                .as_ref()
                .map_or_else(|| v.path.clone(), |c| format!("{}\t{}", v.path, c.title()))
        },
    )
}

fn detail(view: &ViewSnapshot, color: bool) -> String {
    let namespace = view
        .selected_namespace
        .as_ref()
        .map_or("-", |n| n.label.as_str());

    let mut line = format!(
        "{} {}",
        output::paint_accent(&format!("[{namespace}]"), color),
        view.path
    );

    match &view.content {
        Some(doc) => {
            line.push_str(&format!("  {}", doc.title()));
            let mut suffix = format!("({} components)", doc.body().len());
            if !doc.is_valid() {
                suffix.push_str(", some unrenderable");
            }
            line.push_str(&format!("  {}", output::paint_dim(&suffix, color)));
        }
        None if view.loading => {
            line.push_str(&format!("  {}", output::paint_dim("loading...", color)));
        }
        None => {}
    }

    if view.error {
        let message = view.error_message.as_deref().unwrap_or("error");
        line.push('\n');
        line.push_str(&output::paint_error(message, color));
    }

    line
}
