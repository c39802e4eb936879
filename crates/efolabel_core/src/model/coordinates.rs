//! Template calibration data.
//!
//! # Responsibility
//! - Describe where each code copy is drawn on a label template.
//! - Provide the built-in default coordinate set per label type.
//!
//! # Invariants
//! - Units are template-local points, origin at the top-left corner,
//!   y growing downwards. The page is 80x60 mm (226.77 x 170.08 pt).
//! - An unset anchor is skipped by the renderer, never drawn at (0, 0).
//! - `font_size` is finite and positive for any persisted record.

use crate::model::label_type::LabelType;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Page width in millimetres.
pub const PAGE_WIDTH_MM: f64 = 80.0;
/// Page height in millimetres.
pub const PAGE_HEIGHT_MM: f64 = 60.0;
/// Page width in points (72 per inch).
pub const PAGE_WIDTH_PT: f64 = 226.77;
/// Page height in points (72 per inch).
pub const PAGE_HEIGHT_PT: f64 = 170.08;

const DEFAULT_FONT_SIZE: f64 = 8.0;

/// Named position on a template where a code is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Anchor {
    /// Left column, first line.
    Ila1,
    /// Left column, second line.
    Ila2,
    /// Right column, first line.
    Rla1,
    /// Right column, second line.
    Rla2,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Ila1, Anchor::Ila2, Anchor::Rla1, Anchor::Rla2];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ila1 => "ILA1",
            Self::Ila2 => "ILA2",
            Self::Rla1 => "RLA1",
            Self::Rla2 => "RLA2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ILA1" => Some(Self::Ila1),
            "ILA2" => Some(Self::Ila2),
            "RLA1" => Some(Self::Rla1),
            "RLA2" => Some(Self::Rla2),
            _ => None,
        }
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: f64,
    pub y: f64,
}

impl AnchorPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-type calibration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCoordinates {
    pub label_type: LabelType,
    #[serde(rename = "ILA1", default, skip_serializing_if = "Option::is_none")]
    pub ila1: Option<AnchorPoint>,
    #[serde(rename = "ILA2", default, skip_serializing_if = "Option::is_none")]
    pub ila2: Option<AnchorPoint>,
    #[serde(rename = "RLA1", default, skip_serializing_if = "Option::is_none")]
    pub rla1: Option<AnchorPoint>,
    #[serde(rename = "RLA2", default, skip_serializing_if = "Option::is_none")]
    pub rla2: Option<AnchorPoint>,
    pub font_size: f64,
}

/// Validation errors for calibration records.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatesValidationError {
    InvalidFontSize(f64),
    AnchorOutOfPage { anchor: Anchor, x: f64, y: f64 },
}

impl Display for CoordinatesValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFontSize(value) => {
                write!(f, "font_size must be a positive number, got {value}")
            }
            Self::AnchorOutOfPage { anchor, x, y } => write!(
                f,
                "anchor {anchor} at ({x}, {y}) is outside the {PAGE_WIDTH_PT}x{PAGE_HEIGHT_PT} pt page"
            ),
        }
    }
}

impl std::error::Error for CoordinatesValidationError {}

impl LabelCoordinates {
    /// Creates a record with no anchors set.
    pub fn empty(label_type: LabelType, font_size: f64) -> Self {
        Self {
            label_type,
            ila1: None,
            ila2: None,
            rla1: None,
            rla2: None,
            font_size,
        }
    }

    pub fn anchor(&self, anchor: Anchor) -> Option<AnchorPoint> {
        match anchor {
            Anchor::Ila1 => self.ila1,
            Anchor::Ila2 => self.ila2,
            Anchor::Rla1 => self.rla1,
            Anchor::Rla2 => self.rla2,
        }
    }

    pub fn set_anchor(&mut self, anchor: Anchor, point: Option<AnchorPoint>) {
        match anchor {
            Anchor::Ila1 => self.ila1 = point,
            Anchor::Ila2 => self.ila2 = point,
            Anchor::Rla1 => self.rla1 = point,
            Anchor::Rla2 => self.rla2 = point,
        }
    }

    /// Set anchors in `Anchor::ALL` order.
    pub fn defined_anchors(&self) -> Vec<(Anchor, AnchorPoint)> {
        Anchor::ALL
            .iter()
            .filter_map(|anchor| self.anchor(*anchor).map(|point| (*anchor, point)))
            .collect()
    }

    /// Validates font size and that each set anchor lies on the page.
    pub fn validate(&self) -> Result<(), CoordinatesValidationError> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(CoordinatesValidationError::InvalidFontSize(self.font_size));
        }

        for (anchor, point) in self.defined_anchors() {
            let inside = point.x.is_finite()
                && point.y.is_finite()
                && (0.0..=PAGE_WIDTH_PT).contains(&point.x)
                && (0.0..=PAGE_HEIGHT_PT).contains(&point.y);
            if !inside {
                return Err(CoordinatesValidationError::AnchorOutOfPage {
                    anchor,
                    x: point.x,
                    y: point.y,
                });
            }
        }

        Ok(())
    }
}

/// Built-in calibration used when nothing has been stored for a type.
///
/// PatchCord family templates carry four anchors; Pigtail and Bobina
/// templates only use the left column.
pub fn default_coordinates(label_type: LabelType) -> LabelCoordinates {
    let mut coords = LabelCoordinates::empty(label_type, DEFAULT_FONT_SIZE);
    match label_type {
        LabelType::PatchCord => {
            coords.ila1 = Some(AnchorPoint::new(50.0, 60.0));
            coords.ila2 = Some(AnchorPoint::new(50.0, 75.0));
            coords.rla1 = Some(AnchorPoint::new(170.0, 60.0));
            coords.rla2 = Some(AnchorPoint::new(170.0, 75.0));
        }
        LabelType::PatchCordRimport
        | LabelType::PatchCordCoentel
        | LabelType::PatchCordDuplex
        | LabelType::PatchCordDuplexRimport
        | LabelType::PatchCordDuplexCoentel => {
            coords.ila1 = Some(AnchorPoint::new(50.0, 25.0));
            coords.ila2 = Some(AnchorPoint::new(50.0, 38.0));
            coords.rla1 = Some(AnchorPoint::new(170.0, 25.0));
            coords.rla2 = Some(AnchorPoint::new(170.0, 38.0));
        }
        LabelType::Pigtail
        | LabelType::PigtailRimport
        | LabelType::PigtailCoentel
        | LabelType::Bobina => {
            coords.ila1 = Some(AnchorPoint::new(50.0, 25.0));
            coords.ila2 = Some(AnchorPoint::new(50.0, 38.0));
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::{default_coordinates, Anchor, AnchorPoint, CoordinatesValidationError};
    use crate::model::label_type::LabelType;

    #[test]
    fn defaults_are_valid_for_every_type() {
        for label_type in LabelType::ALL {
            default_coordinates(label_type)
                .validate()
                .expect("default coordinates should validate");
        }
    }

    #[test]
    fn pigtail_family_uses_left_column_only() {
        let coords = default_coordinates(LabelType::PigtailRimport);
        let anchors: Vec<_> = coords.defined_anchors().into_iter().map(|(a, _)| a).collect();
        assert_eq!(anchors, vec![Anchor::Ila1, Anchor::Ila2]);
    }

    #[test]
    fn validate_rejects_non_positive_font_and_off_page_anchor() {
        let mut coords = default_coordinates(LabelType::PatchCord);
        coords.font_size = 0.0;
        assert!(matches!(
            coords.validate(),
            Err(CoordinatesValidationError::InvalidFontSize(_))
        ));

        let mut coords = default_coordinates(LabelType::PatchCord);
        coords.set_anchor(Anchor::Rla2, Some(AnchorPoint::new(300.0, 10.0)));
        assert!(matches!(
            coords.validate(),
            Err(CoordinatesValidationError::AnchorOutOfPage {
                anchor: Anchor::Rla2,
                ..
            })
        ));
    }

    #[test]
    fn anchor_parse_is_case_insensitive() {
        assert_eq!(Anchor::parse("rla1"), Some(Anchor::Rla1));
        assert_eq!(Anchor::parse("A1"), None);
    }

    #[test]
    fn serde_uses_anchor_names_and_skips_unset() {
        let json = serde_json::to_value(default_coordinates(LabelType::Bobina)).unwrap();
        assert!(json.get("ILA1").is_some());
        assert!(json.get("RLA1").is_none());
    }
}
