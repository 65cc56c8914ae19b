use qa_report_core::{DirectDownload, Downloader, Result};
use std::path::PathBuf;

/// Saves like [`DirectDownload`], then shows the file in the system file
/// manager so the user can move or rename it.
pub(crate) struct RevealDownload {
    inner: DirectDownload,
}

impl RevealDownload {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self {
            inner: DirectDownload::new(dir),
        }
    }
}

impl Downloader for RevealDownload {
    fn download_image(&self, data_uri: &str, filename: &str) -> Result<PathBuf> {
        let path = self.inner.download_image(data_uri, filename)?;

        // The file is already saved; failing to open the folder is not fatal.
        if let Err(e) = tauri_plugin_opener::reveal_item_in_dir(&path) {
            log::warn!("could not reveal {}: {}", path.display(), e);
        }

        Ok(path)
    }
}
