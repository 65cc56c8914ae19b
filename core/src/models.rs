use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Smallest width/height (in percent) a drawn box must reach to be kept.
pub const MIN_MARKER_SIZE: f64 = 0.6;

/// Tags offered as toggles before any custom tag is added.
pub const PRESET_TAGS: [&str; 3] = ["Development", "Interaction", "Content"];

/// Device classes offered in the environment picker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEnvironment {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Tablet,
    Web,
    Other,
}

impl DeviceEnvironment {
    pub const ALL: [DeviceEnvironment; 5] = [
        DeviceEnvironment::Ios,
        DeviceEnvironment::Android,
        DeviceEnvironment::Tablet,
        DeviceEnvironment::Web,
        DeviceEnvironment::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DeviceEnvironment::Ios => "iOS",
            DeviceEnvironment::Android => "Android",
            DeviceEnvironment::Tablet => "Tablet",
            DeviceEnvironment::Web => "Web",
            DeviceEnvironment::Other => "Other",
        }
    }

    /// Matches a stored environment string against the fixed presets.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|env| *env != DeviceEnvironment::Other)
            .find(|env| env.label() == label)
    }
}

/// Comparison layout derived from the environment.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LayoutClass {
    Mobile,
    Tablet,
    Wide,
}

impl LayoutClass {
    pub fn for_environment(environment: &str) -> Self {
        match DeviceEnvironment::from_label(environment) {
            Some(DeviceEnvironment::Ios) | Some(DeviceEnvironment::Android) => LayoutClass::Mobile,
            Some(DeviceEnvironment::Tablet) => LayoutClass::Tablet,
            _ => LayoutClass::Wide,
        }
    }
}

/// One of the two independent annotation targets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    Actual,
    Expected,
}

/// Image slots on the form. Each maps onto exactly one surface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ImageField {
    Screenshot,
    Expected,
}

impl ImageField {
    pub fn surface(self) -> Surface {
        match self {
            ImageField::Screenshot => Surface::Actual,
            ImageField::Expected => Surface::Expected,
        }
    }
}

/// A user-drawn rectangle in percent of the containing image.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MarkerBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MarkerBox {
    /// Box spanned by two corners, in either drag direction.
    pub fn from_corners(start: Point, end: Point) -> Self {
        Self {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        }
    }

    /// Whether the box is large enough to be committed.
    pub fn is_committable(&self) -> bool {
        self.width >= MIN_MARKER_SIZE && self.height >= MIN_MARKER_SIZE
    }

    /// Whether the box lies entirely inside its image.
    pub fn is_within_bounds(&self) -> bool {
        const EPSILON: f64 = 1e-9;
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        in_range(self.x)
            && in_range(self.y)
            && self.width.is_finite()
            && self.height.is_finite()
            && self.x + self.width <= 100.0 + EPSILON
            && self.y + self.height <= 100.0 + EPSILON
    }
}

/// Keeps only boxes that could have been drawn: large enough and inside the
/// image. Used on every import path.
pub(crate) fn retain_valid_boxes(boxes: Vec<MarkerBox>) -> Vec<MarkerBox> {
    let before = boxes.len();
    let kept: Vec<MarkerBox> = boxes
        .into_iter()
        .filter(|b| b.is_committable() && b.is_within_bounds())
        .collect();
    if kept.len() != before {
        log::warn!("dropped {} invalid marker box(es) on import", before - kept.len());
    }
    kept
}

/// A position in percent of an image's rendered box.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An embedded image together with its original filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub data_uri: String,
    pub file_name: String,
}

/// The single report document being edited.
///
/// Replaced wholesale on every edit. An image and its marker list share a
/// lifetime: whenever an attachment changes, the matching list is cleared.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "ReportDataWire", into = "ReportDataWire")]
pub struct ReportData {
    pub environment: String,
    pub test_date: String,
    pub screenshot: Option<ImageAttachment>,
    pub problem_description: String,
    pub expected_image: Option<ImageAttachment>,
    pub actual_marker_boxes: Vec<MarkerBox>,
    pub expected_marker_boxes: Vec<MarkerBox>,
    pub tags: Vec<String>,
    /// Display-only text carried over from a legacy text expected result.
    pub expected_note: Option<String>,
}

impl ReportData {
    /// Fresh document dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            environment: String::new(),
            test_date: today.format("%Y-%m-%d").to_string(),
            screenshot: None,
            problem_description: String::new(),
            expected_image: None,
            actual_marker_boxes: Vec::new(),
            expected_marker_boxes: Vec::new(),
            tags: Vec::new(),
            expected_note: None,
        }
    }

    pub fn image(&self, field: ImageField) -> Option<&ImageAttachment> {
        match field {
            ImageField::Screenshot => self.screenshot.as_ref(),
            ImageField::Expected => self.expected_image.as_ref(),
        }
    }

    pub fn has_image(&self, surface: Surface) -> bool {
        match surface {
            Surface::Actual => self.screenshot.is_some(),
            Surface::Expected => self.expected_image.is_some(),
        }
    }

    pub fn marker_boxes(&self, surface: Surface) -> &[MarkerBox] {
        match surface {
            Surface::Actual => &self.actual_marker_boxes,
            Surface::Expected => &self.expected_marker_boxes,
        }
    }

    pub(crate) fn marker_boxes_mut(&mut self, surface: Surface) -> &mut Vec<MarkerBox> {
        match surface {
            Surface::Actual => &mut self.actual_marker_boxes,
            Surface::Expected => &mut self.expected_marker_boxes,
        }
    }

    pub(crate) fn image_slot_mut(&mut self, field: ImageField) -> &mut Option<ImageAttachment> {
        match field {
            ImageField::Screenshot => &mut self.screenshot,
            ImageField::Expected => &mut self.expected_image,
        }
    }
}

/// Flat camelCase shape exchanged with the webview and import files.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct ReportDataWire {
    #[serde(default)]
    environment: String,
    #[serde(default)]
    test_date: String,
    #[serde(default)]
    screenshot: Option<String>,
    #[serde(default)]
    screenshot_name: Option<String>,
    #[serde(default)]
    problem_description: String,
    #[serde(default)]
    expected_image: Option<String>,
    #[serde(default)]
    expected_image_name: Option<String>,
    #[serde(default)]
    actual_marker_boxes: Vec<MarkerBox>,
    #[serde(default)]
    expected_marker_boxes: Vec<MarkerBox>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_note: Option<String>,
}

fn attachment(data_uri: Option<String>, name: Option<String>, fallback: &str) -> Option<ImageAttachment> {
    data_uri.map(|data_uri| ImageAttachment {
        data_uri,
        file_name: name.unwrap_or_else(|| fallback.to_string()),
    })
}

impl From<ReportDataWire> for ReportData {
    fn from(wire: ReportDataWire) -> Self {
        let screenshot = attachment(wire.screenshot, wire.screenshot_name, "screenshot");
        let expected_image = attachment(wire.expected_image, wire.expected_image_name, "expected");

        // Boxes without their image have nothing to point at.
        let actual_marker_boxes = if screenshot.is_some() {
            retain_valid_boxes(wire.actual_marker_boxes)
        } else {
            Vec::new()
        };
        let expected_marker_boxes = if expected_image.is_some() {
            retain_valid_boxes(wire.expected_marker_boxes)
        } else {
            Vec::new()
        };

        let mut tags: Vec<String> = Vec::with_capacity(wire.tags.len());
        for tag in wire.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Self {
            environment: wire.environment,
            test_date: wire.test_date,
            screenshot,
            problem_description: wire.problem_description,
            expected_image,
            actual_marker_boxes,
            expected_marker_boxes,
            tags,
            expected_note: wire.expected_note,
        }
    }
}

impl From<ReportData> for ReportDataWire {
    fn from(data: ReportData) -> Self {
        let (screenshot, screenshot_name) = match data.screenshot {
            Some(a) => (Some(a.data_uri), Some(a.file_name)),
            None => (None, None),
        };
        let (expected_image, expected_image_name) = match data.expected_image {
            Some(a) => (Some(a.data_uri), Some(a.file_name)),
            None => (None, None),
        };

        Self {
            environment: data.environment,
            test_date: data.test_date,
            screenshot,
            screenshot_name,
            problem_description: data.problem_description,
            expected_image,
            expected_image_name,
            actual_marker_boxes: data.actual_marker_boxes,
            expected_marker_boxes: data.expected_marker_boxes,
            tags: data.tags,
            expected_note: data.expected_note,
        }
    }
}
