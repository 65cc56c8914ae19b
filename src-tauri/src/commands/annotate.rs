use crate::models::PointerUpResponse;
use crate::state::AppState;
use qa_report_core::{controller, ClientPoint, ElementBounds, MarkerBox, ReportData, Surface};
use tauri::State;

/// Starts drawing on `surface`. Returns `false` when the surface has no image.
#[tauri::command]
pub(crate) fn pointer_down(
    state: State<'_, AppState>,
    surface: Surface,
    point: ClientPoint,
    bounds: ElementBounds,
) -> Result<bool, String> {
    let data = state.snapshot()?;
    let mut annotators = state.annotators.lock().map_err(|e| e.to_string())?;
    Ok(annotators.get_mut(surface).pointer_down(&data, point, bounds))
}

/// Returns the draft box while a gesture is in progress.
#[tauri::command]
pub(crate) fn pointer_move(
    state: State<'_, AppState>,
    surface: Surface,
    point: ClientPoint,
    bounds: ElementBounds,
) -> Result<Option<MarkerBox>, String> {
    let mut annotators = state.annotators.lock().map_err(|e| e.to_string())?;
    Ok(annotators.get_mut(surface).pointer_move(point, bounds))
}

/// Ends the gesture on pointer up, cancel or leave.
#[tauri::command]
pub(crate) fn pointer_up(
    state: State<'_, AppState>,
    surface: Surface,
    point: Option<ClientPoint>,
    bounds: ElementBounds,
) -> Result<PointerUpResponse, String> {
    let mut annotators = state.annotators.lock().map_err(|e| e.to_string())?;
    let mut committed = false;

    let report = state.update(|data| {
        Ok(match annotators.get_mut(surface).pointer_up(data, point, bounds) {
            Some(next) => {
                committed = true;
                next
            }
            None => data.clone(),
        })
    })?;

    Ok(PointerUpResponse { report, committed })
}

#[tauri::command]
pub(crate) fn clear_markers(
    state: State<'_, AppState>,
    surface: Surface,
) -> Result<ReportData, String> {
    state.update(|data| Ok(controller::clear_markers(data, surface)))
}
