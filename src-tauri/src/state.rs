use crate::commands::export::download::RevealDownload;
use qa_report_core::config::{AppConfig, DownloadMode};
use qa_report_core::{
    Annotators, Compositor, DirectDownload, Downloader, ExportGuard, RasterCompositor,
    RenderOptions, ReportData,
};
use std::sync::{Arc, Mutex};

/// Single source of truth for the open report.
pub(crate) struct AppState {
    pub(crate) report: Mutex<ReportData>,
    pub(crate) annotators: Mutex<Annotators>,
    pub(crate) export_guard: ExportGuard,
    pub(crate) config: AppConfig,
    pub(crate) compositor: Arc<dyn Compositor>,
    pub(crate) downloader: Arc<dyn Downloader>,
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Picks the download capability once, at startup.
pub(crate) fn downloader_for(config: &AppConfig) -> Arc<dyn Downloader> {
    let dir = config.download.resolve_directory().unwrap_or_else(|e| {
        log::warn!("{}; exporting to the temp directory", e);
        std::env::temp_dir()
    });

    match config.download.mode {
        DownloadMode::Direct => Arc::new(DirectDownload::new(dir)),
        DownloadMode::Reveal => Arc::new(RevealDownload::new(dir)),
    }
}

impl AppState {
    pub(crate) fn new(config: AppConfig) -> Self {
        let downloader = downloader_for(&config);
        Self::with_capabilities(config, Arc::new(RasterCompositor), downloader)
    }

    pub(crate) fn with_capabilities(
        config: AppConfig,
        compositor: Arc<dyn Compositor>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            report: Mutex::new(ReportData::new(today())),
            annotators: Mutex::new(Annotators::default()),
            export_guard: ExportGuard::default(),
            config,
            compositor,
            downloader,
        }
    }

    pub(crate) fn render_options(&self) -> RenderOptions {
        RenderOptions {
            scale: self.config.export.scale,
            background: self.config.export.background_rgba(),
        }
    }

    pub(crate) fn snapshot(&self) -> Result<ReportData, String> {
        Ok(self.report.lock().map_err(|e| e.to_string())?.clone())
    }

    /// Replaces the document with whatever `edit` derives from it.
    pub(crate) fn update<F>(&self, edit: F) -> Result<ReportData, String>
    where
        F: FnOnce(&ReportData) -> Result<ReportData, String>,
    {
        let mut guard = self.report.lock().map_err(|e| e.to_string())?;
        let next = edit(&guard)?;
        *guard = next.clone();
        Ok(next)
    }
}
