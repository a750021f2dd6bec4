//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One shown string: text, x, y, font resource.
pub struct Line {
    pub text: &'static str,
    pub x: i64,
    pub y: i64,
    pub font: &'static str,
}

pub fn line(text: &'static str, x: i64, y: i64) -> Line {
    Line {
        text,
        x,
        y,
        font: "F1",
    }
}

/// Operations placing each line in its own text object.
pub fn place(lines: &[Line]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for l in lines {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![l.font.into(), 10.into()]));
        ops.push(Operation::new("Td", vec![l.x.into(), l.y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(l.text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Build a PDF with one page per operation list. Pages share the font
/// resources F1 (Helvetica) and F2 (Helvetica-Bold).
pub fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}

/// A one-page report in the indented layout.
pub fn report_pdf() -> Vec<u8> {
    build_pdf(vec![place(&[
        line("Work Order Report", 60, 800),
        line("Service Configurations", 60, 760),
        line("Subscriber address:", 60, 740),
        line("123 Main St", 200, 740),
        line("Service ID:", 60, 720),
        line("SID-42", 200, 720),
        line("Site Operations", 60, 680),
        line("Flexibility point 1", 60, 660),
        line("FP-Alpha", 200, 660),
        line("Add Drop Cable:", 90, 640),
        line("Fiber-7", 60, 620),
        line("Page 1 of 1", 60, 20),
    ])])
}

pub const REPORT_SUMMARY: &str = r#"{"Subscriber address":"123 Main St","LID":"SID-42","Flexibility Points":[{"name":"FP-Alpha","actions":{"Add Drop Cable":{"Fiber-7":""}}}]}"#;
