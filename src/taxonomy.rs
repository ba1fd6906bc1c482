//! Category taxonomy normalization.
//!
//! Maps raw annotation and detector category ids onto a canonical class set so
//! ground truth and detections share one category-id space before evaluation.

use crate::error::{CocoMetricsError, Result};
use crate::stats::RemapStats;
use crate::types::{Category, CocoDataset, Detection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// Raw category id to canonical category id.
///
/// Several raw ids may share one canonical id. Raw ids absent from the mapping
/// are dropped by the remapping functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMapping(BTreeMap<u64, u64>);

impl CategoryMapping {
    pub fn new(pairs: impl IntoIterator<Item = (u64, u64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Mapping applied to the ground-truth annotation file.
    pub fn annotation_default() -> Self {
        Self::new([(14, 2), (24, 1)])
    }

    /// Mapping applied to the detector output.
    pub fn detection_default() -> Self {
        Self::new([(1, 1), (3, 2), (4, 2), (6, 2)])
    }

    pub fn get(&self, raw: u64) -> Option<u64> {
        self.0.get(&raw).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every canonical id the mapping produces is a known category.
    pub fn validate_against(&self, categories: &[Category]) -> Result<()> {
        let known: HashSet<u64> = categories.iter().map(|c| c.id).collect();
        match self.0.values().find(|id| !known.contains(id)) {
            Some(&missing) => Err(CocoMetricsError::UnknownCategory(missing)),
            None => Ok(()),
        }
    }
}

/// The canonical class set: Person and Car.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(1, "Person", Some("none")),
        Category::new(2, "Car", Some("none")),
    ]
}

/// Canonical categories plus the mapping onto them, as stored in a mapping file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    pub mapping: CategoryMapping,
}

impl Taxonomy {
    pub fn annotation_default() -> Self {
        Self {
            categories: default_categories(),
            mapping: CategoryMapping::annotation_default(),
        }
    }

    pub fn detection_default() -> Self {
        Self {
            categories: default_categories(),
            mapping: CategoryMapping::detection_default(),
        }
    }
}

/// Remap a ground-truth dataset onto a canonical taxonomy.
///
/// * annotations with an unmapped category are dropped; survivors get the
///   canonical category and ids renumbered from 1 in input order
/// * images referenced by no surviving annotation are dropped; survivors get
///   ids renumbered from 0 in input order
/// * the category list is replaced by `taxonomy.categories`
///
/// All other fields pass through unchanged.
///
/// # Errors
///
/// * `UnknownCategory` if the mapping targets an id missing from the category list
/// * `InvalidAnnotation` if a surviving annotation refers to an image the dataset
///   does not contain
#[instrument(level = "debug", skip_all, fields(annotations = dataset.annotations.len()))]
pub fn remap_annotations(
    dataset: CocoDataset,
    taxonomy: &Taxonomy,
) -> Result<(CocoDataset, RemapStats)> {
    taxonomy.mapping.validate_against(&taxonomy.categories)?;

    let mut stats = RemapStats::new();
    let mut annotations = Vec::with_capacity(dataset.annotations.len());
    let mut used_images: HashSet<u64> = HashSet::new();
    let mut next_id = 1;

    for mut annotation in dataset.annotations {
        stats.add_item();
        let Some(category_id) = taxonomy.mapping.get(annotation.category_id) else {
            stats.drop_unmapped();
            continue;
        };
        annotation.category_id = category_id;
        annotation.id = next_id;
        next_id += 1;
        used_images.insert(annotation.image_id);
        annotations.push(annotation);
    }

    let total_images = dataset.images.len();
    let mut image_ids: HashMap<u64, u64> = HashMap::new();
    let mut images = Vec::with_capacity(used_images.len());
    for mut image in dataset.images {
        if !used_images.contains(&image.id) {
            continue;
        }
        let new_id = images.len() as u64;
        image_ids.insert(image.id, new_id);
        image.id = new_id;
        images.push(image);
    }
    stats.set_images(total_images, images.len());

    for annotation in &mut annotations {
        let image_id = image_ids.get(&annotation.image_id).copied().ok_or_else(|| {
            CocoMetricsError::InvalidAnnotation(format!(
                "Annotation {} refers to missing image {}",
                annotation.id, annotation.image_id
            ))
        })?;
        annotation.image_id = image_id;
    }

    debug!(kept = annotations.len(), images = images.len(), "annotations remapped");
    let remapped = CocoDataset {
        images,
        annotations,
        categories: taxonomy.categories.clone(),
    };
    Ok((remapped, stats))
}

/// Remap detector output through `mapping`.
///
/// Detections with an unmapped category are dropped; survivors keep their order
/// and every field except `category_id`.
#[instrument(level = "debug", skip_all, fields(detections = detections.len()))]
pub fn remap_detections(
    detections: Vec<Detection>,
    mapping: &CategoryMapping,
) -> (Vec<Detection>, RemapStats) {
    let mut stats = RemapStats::new();
    let remapped = detections
        .into_iter()
        .filter_map(|mut detection| {
            stats.add_item();
            match mapping.get(detection.category_id) {
                Some(category_id) => {
                    detection.category_id = category_id;
                    Some(detection)
                }
                None => {
                    stats.drop_unmapped();
                    None
                }
            }
        })
        .collect();
    (remapped, stats)
}
