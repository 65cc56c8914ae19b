//! Form operations. Each one takes the current document and returns the next.

use crate::error::{ReportError, Result};
use crate::ingest::{self, ImageUpload};
use crate::models::{DeviceEnvironment, ImageAttachment, ImageField, ReportData, Surface};
use chrono::NaiveDate;

/// Outcome of picking an environment button.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentSelection {
    pub report: ReportData,
    /// `true` when the UI should switch to free-text entry.
    pub custom_entry: bool,
}

/// Applies a preset, or clears the field for free-text entry on `Other`.
///
/// Changing device class invalidates both marker lists.
pub fn select_environment(data: &ReportData, env: DeviceEnvironment) -> EnvironmentSelection {
    let mut next = data.clone();
    let custom_entry = env == DeviceEnvironment::Other;

    next.environment = if custom_entry {
        String::new()
    } else {
        env.label().to_string()
    };
    next.actual_marker_boxes.clear();
    next.expected_marker_boxes.clear();

    log::debug!("environment -> {:?}", next.environment);
    EnvironmentSelection {
        report: next,
        custom_entry,
    }
}

/// Free-text environment typed while `Other` is active.
pub fn set_environment_text(data: &ReportData, value: &str) -> ReportData {
    ReportData {
        environment: value.to_string(),
        ..data.clone()
    }
}

pub fn set_test_date(data: &ReportData, value: &str) -> Result<ReportData> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(value.to_string()))?;

    Ok(ReportData {
        test_date: value.to_string(),
        ..data.clone()
    })
}

pub fn set_problem_description(data: &ReportData, value: &str) -> ReportData {
    ReportData {
        problem_description: value.to_string(),
        ..data.clone()
    }
}

/// Removes `tag` if present, appends it otherwise.
pub fn toggle_tag(data: &ReportData, tag: &str) -> ReportData {
    let mut next = data.clone();
    if next.tags.iter().any(|t| t == tag) {
        next.tags.retain(|t| t != tag);
    } else {
        next.tags.push(tag.to_string());
    }
    next
}

/// Pending text of the "add tag" input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagInput {
    pub value: String,
}

/// Appends the trimmed pending tag and clears the buffer.
///
/// Empty or already present values leave both the document and the buffer
/// untouched.
pub fn add_custom_tag(data: &ReportData, input: &mut TagInput) -> ReportData {
    let tag = input.value.trim();
    if tag.is_empty() || data.tags.iter().any(|t| t == tag) {
        return data.clone();
    }

    let mut next = data.clone();
    next.tags.push(tag.to_string());
    input.value.clear();
    next
}

/// Validates and embeds an upload, replacing the field's image.
pub fn upload_image(
    data: &ReportData,
    field: ImageField,
    upload: ImageUpload,
    max_bytes: u64,
) -> Result<ReportData> {
    let attachment = ingest::ingest(upload, max_bytes)?;
    Ok(attach_image(data, field, attachment))
}

/// Installs an already ingested image. Old markers pointed into the previous
/// image and are dropped.
pub fn attach_image(data: &ReportData, field: ImageField, attachment: ImageAttachment) -> ReportData {
    let mut next = data.clone();
    log::info!("{:?} image set to {}", field, attachment.file_name);
    *next.image_slot_mut(field) = Some(attachment);
    next.marker_boxes_mut(field.surface()).clear();
    next
}

pub fn remove_image(data: &ReportData, field: ImageField) -> ReportData {
    let mut next = data.clone();
    *next.image_slot_mut(field) = None;
    next.marker_boxes_mut(field.surface()).clear();
    next
}

pub fn clear_markers(data: &ReportData, surface: Surface) -> ReportData {
    let mut next = data.clone();
    next.marker_boxes_mut(surface).clear();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DEFAULT_MAX_UPLOAD_BYTES;
    use crate::models::MarkerBox;

    fn base() -> ReportData {
        ReportData::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
    }

    fn png(name: &str) -> ImageUpload {
        ImageUpload {
            name: name.to_string(),
            media_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn some_box() -> MarkerBox {
        MarkerBox {
            x: 5.0,
            y: 5.0,
            width: 10.0,
            height: 10.0,
        }
    }

    fn with_images_and_boxes() -> ReportData {
        let data = upload_image(&base(), ImageField::Screenshot, png("a.png"), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        let mut data = upload_image(&data, ImageField::Expected, png("b.png"), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        data.actual_marker_boxes.push(some_box());
        data.expected_marker_boxes.push(some_box());
        data
    }

    #[test]
    fn preset_environment_clears_all_markers() {
        let data = with_images_and_boxes();
        let selection = select_environment(&data, DeviceEnvironment::Android);

        assert_eq!(selection.report.environment, "Android");
        assert!(!selection.custom_entry);
        assert!(selection.report.actual_marker_boxes.is_empty());
        assert!(selection.report.expected_marker_boxes.is_empty());
        // images survive
        assert!(selection.report.screenshot.is_some());
        // input untouched
        assert_eq!(data.actual_marker_boxes.len(), 1);
    }

    #[test]
    fn other_environment_switches_to_free_text() {
        let data = select_environment(&base(), DeviceEnvironment::Ios).report;
        let selection = select_environment(&data, DeviceEnvironment::Other);
        assert_eq!(selection.report.environment, "");
        assert!(selection.custom_entry);

        let typed = set_environment_text(&selection.report, "Smart TV");
        assert_eq!(typed.environment, "Smart TV");
    }

    #[test]
    fn toggle_tag_twice_restores_membership() {
        let data = toggle_tag(&base(), "Content");
        let data = toggle_tag(&data, "Development");
        assert_eq!(data.tags, vec!["Content", "Development"]);

        let once = toggle_tag(&data, "Interaction");
        let twice = toggle_tag(&once, "Interaction");
        assert_eq!(twice.tags, data.tags);

        let removed = toggle_tag(&data, "Content");
        assert_eq!(removed.tags, vec!["Development"]);
    }

    #[test]
    fn custom_tag_is_trimmed_and_clears_input() {
        let mut input = TagInput {
            value: "  regression ".to_string(),
        };
        let data = add_custom_tag(&base(), &mut input);
        assert_eq!(data.tags, vec!["regression"]);
        assert_eq!(input.value, "");
    }

    #[test]
    fn custom_tag_noops() {
        let data = toggle_tag(&base(), "Content");

        for value in ["", "   ", "Content", " Content "] {
            let mut input = TagInput {
                value: value.to_string(),
            };
            let next = add_custom_tag(&data, &mut input);
            assert_eq!(next.tags, data.tags, "value {:?}", value);
            assert_eq!(input.value, value);
        }
    }

    #[test]
    fn replacing_an_image_clears_only_its_markers() {
        let data = with_images_and_boxes();
        let next = upload_image(&data, ImageField::Screenshot, png("c.png"), DEFAULT_MAX_UPLOAD_BYTES).unwrap();

        assert_eq!(next.screenshot.as_ref().unwrap().file_name, "c.png");
        assert!(next.actual_marker_boxes.is_empty());
        assert_eq!(next.expected_marker_boxes.len(), 1);
    }

    #[test]
    fn removing_an_image_clears_name_and_markers() {
        let data = with_images_and_boxes();
        let next = remove_image(&data, ImageField::Expected);

        assert!(next.expected_image.is_none());
        assert!(next.expected_marker_boxes.is_empty());
        assert_eq!(next.actual_marker_boxes.len(), 1);
    }

    #[test]
    fn rejected_upload_leaves_document_untouched() {
        let data = with_images_and_boxes();
        let text = ImageUpload {
            name: "notes.txt".to_string(),
            media_type: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        };

        let err = upload_image(&data, ImageField::Screenshot, text, DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(err, ReportError::InvalidFileType(_)));
        assert_eq!(data.screenshot.as_ref().unwrap().file_name, "a.png");
        assert_eq!(data.actual_marker_boxes.len(), 1);
    }

    #[test]
    fn reuploading_the_same_file_is_accepted() {
        let data = upload_image(&base(), ImageField::Screenshot, png("a.png"), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        let again = upload_image(&data, ImageField::Screenshot, png("a.png"), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(again.screenshot, data.screenshot);
    }

    #[test]
    fn test_date_must_be_iso() {
        assert_eq!(set_test_date(&base(), "2026-12-31").unwrap().test_date, "2026-12-31");
        assert!(matches!(
            set_test_date(&base(), "31/12/2026"),
            Err(ReportError::InvalidDate(_))
        ));
    }

    #[test]
    fn clear_markers_touches_one_surface() {
        let data = with_images_and_boxes();
        let next = clear_markers(&data, Surface::Actual);
        assert!(next.actual_marker_boxes.is_empty());
        assert_eq!(next.expected_marker_boxes, data.expected_marker_boxes);
    }
}
