//! Report export: composite, encode as PNG and hand to the host's download
//! mechanism.

use crate::compose::{Compositor, RenderOptions};
use crate::error::{ReportError, Result};
use crate::ingest::decode_data_uri;
use crate::models::ReportData;
use crate::preview;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// `<YYYYMMDD>_test_report.png` for the day the export runs.
pub fn export_filename(export_day: NaiveDate) -> String {
    format!("{}_test_report.png", export_day.format("%Y%m%d"))
}

/// Host capability that delivers an exported image to the user.
pub trait Downloader: Send + Sync {
    /// Saves `data_uri` under `filename` and returns where it landed.
    fn download_image(&self, data_uri: &str, filename: &str) -> Result<PathBuf>;
}

/// Writes straight into a downloads folder, like a browser download link.
#[derive(Debug, Clone)]
pub struct DirectDownload {
    dir: PathBuf,
}

impl DirectDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `filename` for attempt 0, then `stem (1).ext`, `stem (2).ext`, ...
fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    format!("{} ({}).{}", stem, attempt, ext)
}

/// Creates the first free candidate name in `dir` exclusively, so a file
/// appearing between the check and the write is never overwritten.
fn create_unique(dir: &Path, filename: &str) -> Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let dst = dir.join(candidate_name(filename, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&dst) {
            Ok(file) => return Ok((dst, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                attempt = attempt.checked_add(1).ok_or_else(|| {
                    ReportError::DownloadError(format!("no free name for {}", filename))
                })?;
            }
            Err(e) => {
                return Err(ReportError::DownloadError(format!("{}: {}", dst.display(), e)));
            }
        }
    }
}

impl Downloader for DirectDownload {
    fn download_image(&self, data_uri: &str, filename: &str) -> Result<PathBuf> {
        let (_, bytes) =
            decode_data_uri(data_uri).map_err(|e| ReportError::DownloadError(e.to_string()))?;

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ReportError::DownloadError(format!("{}: {}", self.dir.display(), e)))?;

        let (dst, mut file) = create_unique(&self.dir, filename)?;
        file.write_all(&bytes)
            .map_err(|e| ReportError::DownloadError(format!("{}: {}", dst.display(), e)))?;

        log::info!("saved report to {}", dst.display());
        Ok(dst)
    }
}

/// Allows at most one export in flight.
#[derive(Debug, Clone, Default)]
pub struct ExportGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of an export; releases the guard on drop, including
/// when the export fails.
#[derive(Debug)]
pub struct ExportTicket {
    busy: Arc<AtomicBool>,
}

impl ExportGuard {
    pub fn try_begin(&self) -> Result<ExportTicket> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ReportError::ExportFailure(
                "export already in progress".to_string(),
            ));
        }
        Ok(ExportTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub path: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Renders `data` and delivers the PNG.
///
/// The ticket proves the caller holds the export guard.
pub fn export_report(
    _ticket: &ExportTicket,
    data: &ReportData,
    compositor: &dyn Compositor,
    options: &RenderOptions,
    downloader: &dyn Downloader,
    export_day: NaiveDate,
) -> Result<ExportOutcome> {
    let view = preview::render(data);
    let raster = compositor.render(&view, options)?;
    let data_uri = raster.to_data_uri()?;

    let filename = export_filename(export_day);
    let path = downloader.download_image(&data_uri, &filename)?;

    Ok(ExportOutcome {
        path: path.to_string_lossy().to_string(),
        filename,
        width: raster.width(),
        height: raster.height(),
    })
}
