//! Display model of a report: what the preview pane and the compositor draw.

use crate::models::{LayoutClass, MarkerBox, ReportData, Surface};
use serde::Serialize;

pub const PLACEHOLDER_NOT_SELECTED: &str = "not yet selected";
pub const PLACEHOLDER_NOT_FILLED: &str = "not yet filled in";
pub const PLACEHOLDER_NO_SCREENSHOT: &str = "no screenshot uploaded";

/// One side of the actual/expected comparison.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub surface: Surface,
    pub title: &'static str,
    pub image: Option<String>,
    pub file_name: Option<String>,
    pub boxes: Vec<MarkerBox>,
    /// Whether the "clear markers" action is offered.
    pub can_clear: bool,
    /// Shown in place of a missing image.
    pub placeholder: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub environment: String,
    pub layout: LayoutClass,
    pub test_date: String,
    pub tags: Vec<String>,
    pub problem_description: String,
    pub actual: PanelView,
    pub expected: PanelView,
}

impl ReportView {
    pub fn panel(&self, surface: Surface) -> &PanelView {
        match surface {
            Surface::Actual => &self.actual,
            Surface::Expected => &self.expected,
        }
    }
}

/// Capitalises the first letter and lower-cases the rest.
///
/// Applied to ASCII tags only; anything else is displayed as stored.
pub fn format_tag(tag: &str) -> String {
    if !tag.is_ascii() {
        return tag.to_string();
    }

    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(tag.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_ascii_lowercase());
            out
        }
        None => String::new(),
    }
}

/// `YYYY-MM-DD` shown with slashes.
pub fn format_date(date: &str) -> String {
    if date.trim().is_empty() {
        return PLACEHOLDER_NOT_SELECTED.to_string();
    }
    date.replace('-', "/")
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn panel(data: &ReportData, surface: Surface) -> PanelView {
    let (title, attachment) = match surface {
        Surface::Actual => ("Actual", data.screenshot.as_ref()),
        Surface::Expected => ("Expected", data.expected_image.as_ref()),
    };

    let boxes = data.marker_boxes(surface).to_vec();
    let placeholder = match (attachment, surface) {
        (Some(_), _) => None,
        (None, Surface::Expected) => Some(
            data.expected_note
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_NO_SCREENSHOT.to_string()),
        ),
        (None, Surface::Actual) => Some(PLACEHOLDER_NO_SCREENSHOT.to_string()),
    };

    PanelView {
        surface,
        title,
        image: attachment.map(|a| a.data_uri.clone()),
        file_name: attachment.map(|a| a.file_name.clone()),
        can_clear: attachment.is_some() && !boxes.is_empty(),
        boxes,
        placeholder,
    }
}

pub fn render(data: &ReportData) -> ReportView {
    ReportView {
        environment: or_placeholder(&data.environment, PLACEHOLDER_NOT_SELECTED),
        layout: LayoutClass::for_environment(&data.environment),
        test_date: format_date(&data.test_date),
        tags: data.tags.iter().map(|t| format_tag(t)).collect(),
        problem_description: or_placeholder(&data.problem_description, PLACEHOLDER_NOT_FILLED),
        actual: panel(data, Surface::Actual),
        expected: panel(data, Surface::Expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageAttachment;
    use chrono::NaiveDate;

    fn base() -> ReportData {
        ReportData::new(NaiveDate::from_ymd_opt(2026, 4, 7).unwrap())
    }

    #[test]
    fn tag_capitalisation() {
        assert_eq!(format_tag("development"), "Development");
        assert_eq!(format_tag("UI"), "Ui");
        assert_eq!(format_tag("cONTENT"), "Content");
        assert_eq!(format_tag(""), "");
        // non-ASCII tags are shown as typed
        assert_eq!(format_tag("éCRAN"), "éCRAN");
        assert_eq!(format_tag("介面"), "介面");
    }

    #[test]
    fn empty_fields_show_placeholders() {
        let view = render(&ReportData {
            test_date: String::new(),
            ..base()
        });
        assert_eq!(view.environment, PLACEHOLDER_NOT_SELECTED);
        assert_eq!(view.test_date, PLACEHOLDER_NOT_SELECTED);
        assert_eq!(view.problem_description, PLACEHOLDER_NOT_FILLED);
        assert_eq!(view.actual.placeholder.as_deref(), Some(PLACEHOLDER_NO_SCREENSHOT));
        assert!(!view.actual.can_clear);
    }

    #[test]
    fn filled_report_renders_values() {
        let mut data = base();
        data.environment = "iOS".to_string();
        data.problem_description = "Title is cut off".to_string();
        data.tags = vec!["content".to_string(), "Interaction".to_string()];
        data.screenshot = Some(ImageAttachment {
            data_uri: "data:image/png;base64,AA==".to_string(),
            file_name: "a.png".to_string(),
        });
        data.actual_marker_boxes.push(MarkerBox {
            x: 1.0,
            y: 1.0,
            width: 2.0,
            height: 2.0,
        });

        let view = render(&data);
        assert_eq!(view.environment, "iOS");
        assert_eq!(view.layout, LayoutClass::Mobile);
        assert_eq!(view.test_date, "2026/04/07");
        assert_eq!(view.tags, vec!["Content", "Interaction"]);
        assert!(view.actual.can_clear);
        assert!(view.actual.placeholder.is_none());
        assert!(!view.expected.can_clear);
        // stored tags are untouched
        assert_eq!(data.tags[0], "content");
    }

    #[test]
    fn expected_note_replaces_placeholder() {
        let view = render(&ReportData {
            expected_note: Some("Dialog closes".to_string()),
            ..base()
        });
        assert_eq!(view.expected.placeholder.as_deref(), Some("Dialog closes"));
    }
}
