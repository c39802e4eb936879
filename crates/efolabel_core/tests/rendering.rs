use chrono::NaiveDate;
use efolabel_core::render::RenderError;
use efolabel_core::{
    document_file_name, layout_document, CoordinateService, DocumentRenderer, LabelDocument,
    LabelService, LocalStore, RenderRequest,
};

/// Renders one text line per placement instead of PDF bytes.
struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn render(&self, document: &LabelDocument) -> Result<Vec<u8>, RenderError> {
        if document.pages.is_empty() {
            return Err(RenderError::new("document has no pages"));
        }
        let mut out = String::new();
        for (index, page) in document.pages.iter().enumerate() {
            for placement in &page.placements {
                out.push_str(&format!(
                    "{} {} {:.1},{:.1} {}\n",
                    index + 1,
                    placement.anchor,
                    placement.x,
                    placement.y,
                    placement.text
                ));
            }
        }
        Ok(out.into_bytes())
    }
}

#[test]
fn generated_batch_lays_out_with_resolved_coordinates() {
    let store = LocalStore::in_memory();
    let labels = LabelService::new(&store, &store);
    let coordinates = CoordinateService::new(&store);

    let batch = labels.generate("Pigtail", 2, None).unwrap().batch;
    let (coords, _) = coordinates.resolve(batch.label_type).unwrap();
    let document = layout_document(&RenderRequest {
        label_type: batch.label_type,
        codes: &batch.codes,
        coordinates: &coords,
        template_ref: batch.label_type.config().template_ref,
    });

    assert_eq!(document.template_ref, "AdhesivosPigtails80x60.pdf");
    assert_eq!(document.pages.len(), 2);

    let rendered = String::from_utf8(TextRenderer.render(&document).unwrap()).unwrap();
    assert_eq!(
        rendered,
        "1 ILA1 50.0,25.0 PT-000001\n\
         1 ILA2 50.0,38.0 PT-000001\n\
         2 ILA1 50.0,25.0 PT-000002\n\
         2 ILA2 50.0,38.0 PT-000002\n"
    );

    let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
    assert_eq!(
        document_file_name(batch.label_type.prefix(), document.pages.len(), date),
        "EFO_PT_2_etiquetas_2026-03-05.pdf"
    );
}

#[test]
fn renderer_errors_surface_to_the_caller() {
    let coords = efolabel_core::default_coordinates(efolabel_core::LabelType::Bobina);
    let document = layout_document(&RenderRequest {
        label_type: efolabel_core::LabelType::Bobina,
        codes: &[],
        coordinates: &coords,
        template_ref: "AdhesivosBobina80x60.pdf",
    });

    let err = TextRenderer.render(&document).unwrap_err();
    assert_eq!(err.to_string(), "render failed: document has no pages");
}
