use crate::models::{EnvironmentResponse, TagResponse, UploadPayload};
use crate::state::{today, AppState};
use qa_report_core::controller::{self, TagInput};
use qa_report_core::legacy::import_report_json;
use qa_report_core::{ingest, preview, DeviceEnvironment, ImageField, ReportData, ReportView};
use std::path::PathBuf;
use tauri::State;

/// Returns the current report document.
#[tauri::command]
pub(crate) fn get_report(state: State<'_, AppState>) -> Result<ReportData, String> {
    state.snapshot()
}

/// Starts over with an empty report dated today.
#[tauri::command]
pub(crate) fn reset_report(state: State<'_, AppState>) -> Result<ReportData, String> {
    state.update(|_| Ok(ReportData::new(today())))
}

#[tauri::command]
pub(crate) fn select_environment(
    state: State<'_, AppState>,
    environment: DeviceEnvironment,
) -> Result<EnvironmentResponse, String> {
    let mut custom_entry = false;
    let report = state.update(|data| {
        let selection = controller::select_environment(data, environment);
        custom_entry = selection.custom_entry;
        Ok(selection.report)
    })?;

    Ok(EnvironmentResponse {
        report,
        custom_entry,
    })
}

#[tauri::command]
pub(crate) fn set_environment_text(
    state: State<'_, AppState>,
    value: String,
) -> Result<ReportData, String> {
    state.update(|data| Ok(controller::set_environment_text(data, &value)))
}

#[tauri::command]
pub(crate) fn set_test_date(state: State<'_, AppState>, value: String) -> Result<ReportData, String> {
    state.update(|data| controller::set_test_date(data, &value).map_err(|e| e.to_string()))
}

#[tauri::command]
pub(crate) fn set_problem_description(
    state: State<'_, AppState>,
    value: String,
) -> Result<ReportData, String> {
    state.update(|data| Ok(controller::set_problem_description(data, &value)))
}

#[tauri::command]
pub(crate) fn toggle_tag(state: State<'_, AppState>, tag: String) -> Result<ReportData, String> {
    state.update(|data| Ok(controller::toggle_tag(data, &tag)))
}

/// Adds the typed custom tag. `pending` echoes what the input should keep.
#[tauri::command]
pub(crate) fn add_custom_tag(
    state: State<'_, AppState>,
    value: String,
) -> Result<TagResponse, String> {
    let mut input = TagInput { value };
    let report = state.update(|data| Ok(controller::add_custom_tag(data, &mut input)))?;

    Ok(TagResponse {
        report,
        pending: input.value,
    })
}

/// Embeds an image picked in the webview.
///
/// Encoding runs off the main thread; the document is swapped once it
/// completes. Overlapping uploads on the same field resolve last-writer-wins.
#[tauri::command]
pub(crate) async fn upload_image(
    state: State<'_, AppState>,
    field: ImageField,
    file: UploadPayload,
) -> Result<ReportData, String> {
    let max_bytes = state.config.upload.max_bytes;
    let upload = qa_report_core::ImageUpload {
        name: file.name,
        media_type: file.media_type,
        bytes: file.bytes,
    };

    let attachment =
        tauri::async_runtime::spawn_blocking(move || ingest::ingest(upload, max_bytes))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?;

    state.update(|data| Ok(controller::attach_image(data, field, attachment)))
}

/// Embeds an image read from disk (drag-and-drop of a file path).
#[tauri::command]
pub(crate) async fn upload_image_from_path(
    state: State<'_, AppState>,
    field: ImageField,
    path: String,
) -> Result<ReportData, String> {
    let max_bytes = state.config.upload.max_bytes;
    let path = PathBuf::from(path);

    let attachment =
        tauri::async_runtime::spawn_blocking(move || ingest::ingest_path(&path, max_bytes))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?;

    state.update(|data| Ok(controller::attach_image(data, field, attachment)))
}

#[tauri::command]
pub(crate) fn remove_image(
    state: State<'_, AppState>,
    field: ImageField,
) -> Result<ReportData, String> {
    state.update(|data| Ok(controller::remove_image(data, field)))
}

/// Display model of the current report for the preview pane.
#[tauri::command]
pub(crate) fn preview_report(state: State<'_, AppState>) -> Result<ReportView, String> {
    Ok(preview::render(&state.snapshot()?))
}

/// Loads a saved report JSON, migrating the single-marker layout if needed.
#[tauri::command]
pub(crate) fn import_report(state: State<'_, AppState>, json: String) -> Result<ReportData, String> {
    let imported = import_report_json(&json).map_err(|e| e.to_string())?;
    state.update(|_| Ok(imported))
}
