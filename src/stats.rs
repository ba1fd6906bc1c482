//! Statistics tracking for taxonomy remapping
//!
//! Counts what a remapping pass kept and dropped so callers can report how much
//! of a dataset survived the category correction.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Statistics collected while remapping annotations or detections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemapStats {
    /// Total number of annotations or detections seen
    pub total_items: usize,

    /// Number of items dropped because their category has no canonical counterpart
    pub dropped_unmapped: usize,

    /// Total number of images seen
    pub total_images: usize,

    /// Number of images dropped because none of their annotations survived
    pub dropped_images: usize,
}

impl RemapStats {
    /// Create a new `RemapStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the total items counter
    pub fn add_item(&mut self) {
        self.total_items += 1;
    }

    /// Record an item dropped for an unmapped category
    pub fn drop_unmapped(&mut self) {
        self.dropped_unmapped += 1;
    }

    /// Set the image counters
    pub fn set_images(&mut self, total: usize, kept: usize) {
        self.total_images = total;
        self.dropped_images = total.saturating_sub(kept);
    }

    /// Number of items that survived remapping
    pub fn kept_items(&self) -> usize {
        self.total_items.saturating_sub(self.dropped_unmapped)
    }

    /// Number of images that survived remapping
    pub fn kept_images(&self) -> usize {
        self.total_images.saturating_sub(self.dropped_images)
    }

    /// Emit the statistics as a single `info` event
    pub fn log_summary(&self, what: &str) {
        info!(
            what,
            total = self.total_items,
            kept = self.kept_items(),
            dropped_unmapped = self.dropped_unmapped,
            total_images = self.total_images,
            kept_images = self.kept_images(),
            "remap finished"
        );
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "RemapStats {{ total: {}, kept: {}, dropped: {}, images: {}, kept_images: {} }}",
            self.total_items,
            self.kept_items(),
            self.dropped_unmapped,
            self.total_images,
            self.kept_images()
        )
    }
}
