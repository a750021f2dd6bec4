//! Extraction tests on PDFs built in memory.

mod common;

use lopdf::content::Operation;
use lopdf::Object;

use wrextract::parser::{extract_fragments, FragmentExtractor, LopdfBackend, PdfBackend};
use wrextract::{Error, ExtractOptions, Pipeline, Profile};

fn show(text: &str) -> Operation {
    Operation::new("Tj", vec![Object::string_literal(text)])
}

#[test]
fn test_fragments_carry_position_and_font() {
    let data = common::build_pdf(vec![common::place(&[
        common::line("Service ID:", 60, 720),
        common::Line {
            text: "Connect equipment",
            x: 70,
            y: 600,
            font: "F2",
        },
    ])]);

    let fragments = extract_fragments(&data).unwrap();
    assert_eq!(fragments.len(), 2);

    assert_eq!(fragments[0].text, "Service ID:");
    assert_eq!((fragments[0].x, fragments[0].y), (60.0, 720.0));
    assert_eq!(fragments[0].font_name, "F1");
    assert_eq!(fragments[0].height, 10.0);

    assert_eq!(fragments[1].font_name, "F2");
    assert!(fragments.iter().all(|f| f.page == 1 && !f.end_of_line));
}

#[test]
fn test_wrapped_line_sets_end_of_line() {
    let ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("TL", vec![11.into()]),
        Operation::new("Td", vec![60.into(), 600.into()]),
        show("Flexibility"),
        Operation::new("T*", vec![]),
        show("point 3"),
        Operation::new("ET", vec![]),
    ];
    let data = common::build_pdf(vec![ops]);

    let fragments = extract_fragments(&data).unwrap();
    assert_eq!(fragments.len(), 2);
    assert!(fragments[0].end_of_line);
    assert!(!fragments[1].end_of_line);
    assert_eq!((fragments[1].x, fragments[1].y), (60.0, 589.0));
}

#[test]
fn test_line_flag_belongs_to_last_fragment_of_the_row() {
    let mut ops = common::place(&[
        common::line("Top", 60, 800),
        common::line("Service Configurations", 60, 760),
    ]);
    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![60.into(), 700.into()]),
        show("From Port Logical"),
        Operation::new("Td", vec![140.into(), 0.into()]),
        show("ODF-1/2"),
        Operation::new("Td", vec![(-140).into(), (-12).into()]),
        show("location:"),
        Operation::new("ET", vec![]),
    ]);
    ops.extend(common::place(&[common::line("Bottom", 60, 20)]));
    let data = common::build_pdf(vec![ops]);

    let pipeline = Pipeline::new().with_profile(Profile::indented());
    let fragments = pipeline.extract_fragments(&data).unwrap();
    let blocks = pipeline.merge(&fragments);
    let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();

    // "ODF-1/2" is the fragment before the line advance, so the value
    // column carries the flag; the label column does not continue.
    assert_eq!(
        texts,
        vec![
            "Service Configurations",
            "From Port Logical",
            "ODF-1/2",
            "location:"
        ]
    );
}

#[test]
fn test_pages_are_numbered_in_order() {
    let data = common::build_pdf(vec![
        common::place(&[common::line("first page", 60, 700)]),
        common::place(&[common::line("second page", 60, 700)]),
    ]);

    let fragments = extract_fragments(&data).unwrap();
    let pages: Vec<u32> = fragments.iter().map(|f| f.page).collect();
    assert_eq!(pages, vec![1, 2]);

    let raw = Pipeline::new().extract(&data, "two.pdf").unwrap();
    assert_eq!(raw.metadata.page_count, 2);
}

#[test]
fn test_scaled_coordinates() {
    let ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                0.5.into(),
                0.into(),
                0.into(),
                0.5.into(),
                0.into(),
                0.into(),
            ],
        ),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 20.into()]),
        Operation::new("Td", vec![120.into(), 1400.into()]),
        show("Site Operations"),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ];
    let data = common::build_pdf(vec![ops]);

    let fragments = extract_fragments(&data).unwrap();
    assert_eq!((fragments[0].x, fragments[0].y), (60.0, 700.0));
    assert_eq!(fragments[0].height, 10.0);
}

#[test]
fn test_backend_lists_font_resources() {
    let data = common::report_pdf();
    let backend = LopdfBackend::load_bytes(&data).unwrap();
    assert_eq!(backend.page_count(), 1);

    let (_, page_id) = backend.pages().into_iter().next().unwrap();
    let mut fonts = backend.page_fonts(page_id).unwrap();
    fonts.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(fonts[0].name, "F1");
    assert_eq!(fonts[0].base_font, "Helvetica");
    assert_eq!(fonts[1].base_font, "Helvetica-Bold");

    let fragments = FragmentExtractor::new(&backend, ExtractOptions::default())
        .extract()
        .unwrap();
    assert_eq!(fragments.len(), 12);
}

#[test]
fn test_not_a_pdf() {
    assert!(matches!(
        extract_fragments(b"PK\x03\x04 zip archive"),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn test_unsupported_version() {
    assert!(matches!(
        extract_fragments(b"%PDF-x.y\n"),
        Err(Error::UnsupportedVersion(_))
    ));
}
