/// Returns the application version from Cargo package metadata.
#[tauri::command]
pub(crate) fn app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Returns the current target OS as a short string (e.g. `windows`, `macos`).
#[tauri::command]
pub(crate) fn platform_os() -> String {
    std::env::consts::OS.to_string()
}

/// Upload ceiling in bytes, so the webview can reject oversized files early.
#[tauri::command]
pub(crate) fn upload_limit(state: tauri::State<'_, crate::state::AppState>) -> u64 {
    state.config.upload.max_bytes
}
