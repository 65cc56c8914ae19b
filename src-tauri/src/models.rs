use qa_report_core::ReportData;
use serde::{Deserialize, Serialize};

/// Result of picking an environment button.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnvironmentResponse {
    pub(crate) report: ReportData,
    /// The webview switches to a free-text field when set.
    pub(crate) custom_entry: bool,
}

/// Result of submitting the "add tag" field.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagResponse {
    pub(crate) report: ReportData,
    /// What the input should show afterwards (empty once the tag was added).
    pub(crate) pending: String,
}

/// A file chosen through the webview's file input.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadPayload {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) media_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Result of releasing the pointer over a surface.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PointerUpResponse {
    pub(crate) report: ReportData,
    pub(crate) committed: bool,
}
