mod commands;
mod models;
mod state;

use commands::{annotate, app, export, report};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    qa_report_core::logging::init("qa-report-builder");

    let config = qa_report_core::config::load_config();
    log::info!(
        "starting v{} (download mode {:?}, export scale {})",
        env!("CARGO_PKG_VERSION"),
        config.download.mode,
        config.export.scale
    );

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(state::AppState::new(config))
        .invoke_handler(tauri::generate_handler![
            app::app_version,
            app::platform_os,
            app::upload_limit,
            report::get_report,
            report::reset_report,
            report::select_environment,
            report::set_environment_text,
            report::set_test_date,
            report::set_problem_description,
            report::toggle_tag,
            report::add_custom_tag,
            report::upload_image,
            report::upload_image_from_path,
            report::remove_image,
            report::preview_report,
            report::import_report,
            annotate::pointer_down,
            annotate::pointer_move,
            annotate::pointer_up,
            annotate::clear_markers,
            export::export_report,
            export::export_in_progress
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
