//! Calibration coordinate service.
//!
//! # Responsibility
//! - Read and replace stored calibration per label type.
//! - Resolve the effective coordinates for rendering, falling back to the
//!   built-in defaults when nothing is stored.

use crate::error::LabelResult;
use crate::model::coordinates::{default_coordinates, LabelCoordinates};
use crate::model::label_type::LabelType;
use crate::repo::coordinate_repo::{CoordinateRecord, CoordinateRepository};
use crate::service::{normalize_actor, now_epoch_ms};
use log::info;

/// Where resolved coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    Stored,
    BuiltInDefault,
}

pub struct CoordinateService<R: CoordinateRepository> {
    repo: R,
}

impl<R: CoordinateRepository> CoordinateService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stored record only; `None` when the type was never calibrated.
    pub fn get(&self, label_type: LabelType) -> LabelResult<Option<CoordinateRecord>> {
        Ok(self.repo.get_coordinates(label_type)?)
    }

    /// Replaces the stored record for `coordinates.label_type`.
    pub fn put(&self, coordinates: &LabelCoordinates, updated_by: Option<&str>) -> LabelResult<()> {
        let updated_by = normalize_actor(updated_by);
        self.repo
            .put_coordinates(coordinates, now_epoch_ms(), updated_by.as_deref())?;
        info!(
            "event=coordinates_put module=coordinates status=ok label_type={} anchors={} font_size={}",
            coordinates.label_type,
            coordinates.defined_anchors().len(),
            coordinates.font_size
        );
        Ok(())
    }

    /// Replaces the stored records for every entry in `records` at once.
    ///
    /// Every record is validated first; on any failure nothing is written.
    pub fn put_all(&self, records: &[LabelCoordinates], updated_by: Option<&str>) -> LabelResult<()> {
        let updated_by = normalize_actor(updated_by);
        self.repo
            .put_all_coordinates(records, now_epoch_ms(), updated_by.as_deref())?;
        info!(
            "event=coordinates_put_all module=coordinates status=ok records={}",
            records.len()
        );
        Ok(())
    }

    /// Effective coordinates for a type.
    pub fn resolve(&self, label_type: LabelType) -> LabelResult<(LabelCoordinates, CoordinateSource)> {
        Ok(match self.repo.get_coordinates(label_type)? {
            Some(record) => (record.coordinates, CoordinateSource::Stored),
            None => (default_coordinates(label_type), CoordinateSource::BuiltInDefault),
        })
    }

    /// Effective coordinates for every registered type, in registry order.
    pub fn resolve_all(&self) -> LabelResult<Vec<LabelCoordinates>> {
        let stored = self.repo.list_coordinates()?;
        Ok(LabelType::ALL
            .iter()
            .map(|label_type| {
                stored
                    .iter()
                    .find(|record| record.coordinates.label_type == *label_type)
                    .map(|record| record.coordinates.clone())
                    .unwrap_or_else(|| default_coordinates(*label_type))
            })
            .collect())
    }

    /// Overwrites the stored record with the built-in defaults.
    pub fn reset(&self, label_type: LabelType, updated_by: Option<&str>) -> LabelResult<LabelCoordinates> {
        let defaults = default_coordinates(label_type);
        self.put(&defaults, updated_by)?;
        Ok(defaults)
    }
}
