//! Core of the QA report builder.
//!
//! Everything here is headless: the report document and its form operations,
//! marker drawing, image ingestion, the preview model, compositing and
//! export. The desktop shell in `src-tauri` only wires these to commands.

pub mod annotator;
pub mod compose;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod ingest;
pub mod legacy;
pub mod logging;
pub mod models;
pub mod preview;

pub use annotator::{Annotator, Annotators, ClientPoint, ElementBounds};
pub use compose::{Compositor, RasterCompositor, RasterImage, RenderOptions};
pub use config::AppConfig;
pub use error::{ReportError, Result};
pub use export::{DirectDownload, Downloader, ExportGuard, ExportOutcome};
pub use ingest::ImageUpload;
pub use models::{DeviceEnvironment, ImageAttachment, ImageField, MarkerBox, Point, ReportData, Surface};
pub use preview::ReportView;
