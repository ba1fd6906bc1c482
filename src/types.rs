//! Core data types for COCO annotations and detector output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents a category in the COCO dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

impl Category {
    /// Create a new category.
    pub fn new(id: u64, name: impl Into<String>, supercategory: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            supercategory: supercategory.map(str::to_string),
        }
    }
}

/// Represents an image in the COCO dataset.
///
/// Fields beyond the ones modelled here (license, coco_url, ...) are kept in
/// `extra` so a remapped dataset serializes back with everything it came in with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub file_name: String,
    pub height: u32,
    pub width: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Represents a ground-truth annotation in COCO format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,
    /// Bounding box in [x, y, width, height] format
    pub bbox: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Create an annotation with no extra fields.
    pub fn new(id: u64, image_id: u64, category_id: u64, bbox: Vec<f64>) -> Self {
        let area = if bbox.len() == 4 { Some(bbox[2] * bbox[3]) } else { None };
        Self {
            id,
            image_id,
            category_id,
            bbox,
            area,
            iscrowd: None,
            extra: Map::new(),
        }
    }
}

/// A single detector output in the COCO results format.
///
/// Result files are a bare JSON list of these and carry no annotation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub image_id: u64,
    pub category_id: u64,
    pub bbox: Vec<f64>,
    pub score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Detection {
    /// Create a detection with no extra fields.
    pub fn new(image_id: u64, category_id: u64, bbox: Vec<f64>, score: f64) -> Self {
        Self {
            image_id,
            category_id,
            bbox,
            score,
            extra: Map::new(),
        }
    }
}

/// Represents a complete COCO dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoDataset {
    #[serde(default)]
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl CocoDataset {
    /// Look up a category by name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}
