//! One-time migration of the single-marker report shape.
//!
//! Older documents carried one `markerBox` for the screenshot and let the
//! expected result be either text or an image.

use crate::error::{ReportError, Result};
use crate::models::{retain_valid_boxes, ImageAttachment, MarkerBox, ReportData};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedResultType {
    Text,
    #[default]
    Image,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LegacyReportData {
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub test_date: String,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub problem_description: String,
    #[serde(default)]
    pub expected_result_type: ExpectedResultType,
    #[serde(default)]
    pub expected_text: String,
    #[serde(default)]
    pub expected_image: Option<String>,
    #[serde(default)]
    pub marker_box: Option<MarkerBox>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<LegacyReportData> for ReportData {
    fn from(legacy: LegacyReportData) -> Self {
        let screenshot = legacy.screenshot.map(|data_uri| ImageAttachment {
            data_uri,
            file_name: "screenshot".to_string(),
        });

        let actual_marker_boxes = match (&screenshot, legacy.marker_box) {
            (Some(_), Some(b)) => retain_valid_boxes(vec![b]),
            _ => Vec::new(),
        };

        // A text expected result has no image counterpart any more; keep the
        // words as a read-only note.
        let (expected_image, expected_note) = match legacy.expected_result_type {
            ExpectedResultType::Image => (
                legacy.expected_image.map(|data_uri| ImageAttachment {
                    data_uri,
                    file_name: "expected".to_string(),
                }),
                None,
            ),
            ExpectedResultType::Text => {
                let text = legacy.expected_text.trim();
                (None, (!text.is_empty()).then(|| text.to_string()))
            }
        };

        let mut tags: Vec<String> = Vec::with_capacity(legacy.tags.len());
        for tag in legacy.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        ReportData {
            environment: legacy.environment,
            test_date: legacy.test_date,
            screenshot,
            problem_description: legacy.problem_description,
            expected_image,
            actual_marker_boxes,
            expected_marker_boxes: Vec::new(),
            tags,
            expected_note,
        }
    }
}

/// Whether a JSON document uses the single-marker layout.
pub fn is_legacy(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| {
            obj.contains_key("markerBox")
                || obj.contains_key("expectedResultType")
                || obj.contains_key("expectedText")
        })
        .unwrap_or(false)
}

/// Parses a saved report in either the current or the legacy layout.
pub fn import_report_json(json: &str) -> Result<ReportData> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ReportError::FileReadError(e.to_string()))?;

    if is_legacy(&value) {
        log::info!("migrating legacy report document");
        let legacy: LegacyReportData =
            serde_json::from_value(value).map_err(|e| ReportError::FileReadError(e.to_string()))?;
        return Ok(legacy.into());
    }

    serde_json::from_value(value).map_err(|e| ReportError::FileReadError(e.to_string()))
}
