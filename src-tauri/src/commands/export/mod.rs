pub(crate) mod download;

use crate::state::{today, AppState};
use qa_report_core::export::{self, ExportOutcome};
use tauri::State;

/// Renders the report to PNG and delivers it through the configured
/// download capability.
///
/// Only one export runs at a time; the guard is released when the ticket
/// drops, so a failure leaves the button usable.
#[tauri::command]
pub(crate) async fn export_report(state: State<'_, AppState>) -> Result<ExportOutcome, String> {
    let ticket = state.export_guard.try_begin().map_err(|e| e.to_string())?;

    let data = state.snapshot()?;
    let options = state.render_options();
    let compositor = state.compositor.clone();
    let downloader = state.downloader.clone();

    let outcome = tauri::async_runtime::spawn_blocking(move || {
        export::export_report(
            &ticket,
            &data,
            compositor.as_ref(),
            &options,
            downloader.as_ref(),
            today(),
        )
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| {
        log::error!("export failed: {}", e);
        e.to_string()
    })?;

    log::info!(
        "exported {} ({}x{})",
        outcome.filename,
        outcome.width,
        outcome.height
    );
    Ok(outcome)
}

/// Whether an export is currently running.
#[tauri::command]
pub(crate) fn export_in_progress(state: State<'_, AppState>) -> bool {
    state.export_guard.is_busy()
}
