//! Rendering boundary.
//!
//! # Responsibility
//! - Turn codes + calibration into a paginated, drawing-ready layout.
//! - Define the seam (`DocumentRenderer`) where a PDF backend plugs in.
//!
//! # Invariants
//! - Exactly one page per code, in input order.
//! - Each page places the code at every set anchor and skips unset ones.
//! - Layout is a pure function of its input.

use crate::model::coordinates::{Anchor, LabelCoordinates, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use crate::model::label_type::LabelType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input of the layout step.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest<'a> {
    pub label_type: LabelType,
    pub codes: &'a [String],
    pub coordinates: &'a LabelCoordinates,
    pub template_ref: &'a str,
}

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Fixed 80x60 mm label page.
pub const LABEL_PAGE: PageSize = PageSize {
    width: PAGE_WIDTH_PT,
    height: PAGE_HEIGHT_PT,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub anchor: Anchor,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPage {
    pub code: String,
    pub placements: Vec<TextPlacement>,
}

/// Drawing-ready document handed to a [`DocumentRenderer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDocument {
    pub label_type: LabelType,
    pub template_ref: String,
    pub page_size: PageSize,
    pub pages: Vec<LabelPage>,
}

/// Error raised by a rendering backend.
#[derive(Debug)]
pub struct RenderError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "render failed: {}", self.message)
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Backend that draws a [`LabelDocument`] onto its template (e.g. PDF).
pub trait DocumentRenderer {
    fn render(&self, document: &LabelDocument) -> Result<Vec<u8>, RenderError>;
}

/// Lays out one page per code.
pub fn layout_document(request: &RenderRequest<'_>) -> LabelDocument {
    let anchors = request.coordinates.defined_anchors();
    let pages = request
        .codes
        .iter()
        .map(|code| LabelPage {
            code: code.clone(),
            placements: anchors
                .iter()
                .map(|(anchor, point)| TextPlacement {
                    anchor: *anchor,
                    x: point.x,
                    y: point.y,
                    font_size: request.coordinates.font_size,
                    text: code.clone(),
                })
                .collect(),
        })
        .collect();

    LabelDocument {
        label_type: request.label_type,
        template_ref: request.template_ref.to_string(),
        page_size: LABEL_PAGE,
        pages,
    }
}

/// Download name for a rendered document, e.g.
/// `EFO_PC_3_etiquetas_2026-10-17.pdf`.
pub fn document_file_name(prefix: &str, count: usize, date: NaiveDate) -> String {
    format!("EFO_{prefix}_{count}_etiquetas_{}.pdf", date.format("%Y-%m-%d"))
}

/// [`document_file_name`] stamped with the local calendar date.
pub fn document_file_name_today(prefix: &str, count: usize) -> String {
    document_file_name(prefix, count, chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::{document_file_name, layout_document, RenderRequest, LABEL_PAGE};
    use crate::model::coordinates::{default_coordinates, Anchor};
    use crate::model::label_type::LabelType;
    use chrono::NaiveDate;

    #[test]
    fn one_page_per_code_with_every_set_anchor() {
        let coordinates = default_coordinates(LabelType::PatchCord);
        let codes = vec!["PC-000001".to_string(), "PC-000002".to_string()];
        let document = layout_document(&RenderRequest {
            label_type: LabelType::PatchCord,
            codes: &codes,
            coordinates: &coordinates,
            template_ref: LabelType::PatchCord.config().template_ref,
        });

        assert_eq!(document.page_size, LABEL_PAGE);
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[1].code, "PC-000002");
        assert_eq!(document.pages[0].placements.len(), 4);
        assert!(document.pages[1]
            .placements
            .iter()
            .all(|p| p.text == "PC-000002" && p.font_size == 8.0));
    }

    #[test]
    fn unset_anchors_are_skipped() {
        let mut coordinates = default_coordinates(LabelType::Bobina);
        coordinates.set_anchor(Anchor::Ila2, None);
        let codes = vec!["BB-000009".to_string()];
        let document = layout_document(&RenderRequest {
            label_type: LabelType::Bobina,
            codes: &codes,
            coordinates: &coordinates,
            template_ref: "AdhesivosBobina80x60.pdf",
        });

        let anchors: Vec<_> = document.pages[0].placements.iter().map(|p| p.anchor).collect();
        assert_eq!(anchors, vec![Anchor::Ila1]);
    }

    #[test]
    fn file_name_follows_download_convention() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(
            document_file_name("PCD", 12, date),
            "EFO_PCD_12_etiquetas_2026-10-17.pdf"
        );
    }
}
