//! Integration tests for flattening (pancake-renderer).
//!
//! Exercises the converter against HTML pages, real SVG rasterization,
//! all output formats, page replacement and downloads.

use pancake_core::{
    Attributes, Document, Element, ElementId, ElementKind, RecordingHost, Surface,
};
use pancake_renderer::data_uri;
use pancake_renderer::{
    ConvertOptions, Converter, DirectoryHost, ImageFormat, RenderError, Source,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PAGE: &str = r##"<!DOCTYPE html>
<html><body>
  <h1 id="title">Report</h1>
  <svg id="chart1" width="40" height="20">
    <rect x="0" y="0" width="20" height="20" fill="#ff0000"></rect>
    <rect x="20" y="0" width="20" height="20" fill="#0000ff"></rect>
  </svg>
  <canvas id="plot" width="8" height="4"></canvas>
  <p id="after">caption</p>
</body></html>"##;

/// Route library logs to the test harness; `RUST_LOG` overrides the filter.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pancake_core=debug,pancake_renderer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Parse the test page and paint the canvas solid green.
fn page() -> Document {
    init_tracing();
    let mut doc = Document::from_html(PAGE).expect("parse page");
    let plot = doc.get_element_by_id("plot").expect("canvas");
    let mut surface = Surface::new(8, 4);
    surface.fill([0, 255, 0, 255]);
    doc.element_mut(plot).expect("canvas").surface = Some(surface);
    doc
}

/// Child elements of `parent`, skipping text nodes.
fn element_children(doc: &Document, parent: ElementId) -> Vec<ElementId> {
    doc.children(parent)
        .iter()
        .copied()
        .filter(|&id| doc.element(id).is_some_and(|e| !e.is_text()))
        .collect()
}

// ==========================================================================
// Raster sources
// ==========================================================================

#[test]
fn test_canvas_dimensions_and_data_uri() {
    let mut doc = page();
    for (token, mime) in [
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("webp", "image/webp"),
    ] {
        let flat = Converter::new(&mut doc, "plot", ConvertOptions::default().with_format(token))
            .expect("convert");
        assert_eq!(flat.source_kind(), ElementKind::RasterCanvas);
        assert_eq!(flat.image().width(), Some(8));
        assert_eq!(flat.image().height(), Some(4));
        assert!(
            flat.data_uri().starts_with(&format!("data:{mime};base64,")),
            "unexpected prefix for {token}: {}",
            &flat.data_uri()[..30]
        );
    }
}

#[test]
fn test_canvas_pixels_survive_png() {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default()).expect("convert");
    let decoded = data_uri::decode_to_surface(flat.data_uri()).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (8, 4));
    assert_eq!(decoded.pixel(3, 2), Some([0, 255, 0, 255]));
}

#[test]
fn test_zero_sized_canvas() {
    let mut doc = Document::new();
    let canvas = doc.add_element(Element::new("canvas").with_surface(Surface::new(0, 0)));
    let flat = Converter::new(&mut doc, canvas, ConvertOptions::default()).expect("convert");
    assert_eq!(flat.data_uri(), "data:,");
    assert_eq!(flat.image().width(), None);
    assert_eq!(flat.image().height(), None);
}

// ==========================================================================
// Vector sources
// ==========================================================================

#[test]
fn test_svg_is_rasterized_with_resvg() {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "chart1", ConvertOptions::default()).expect("convert");
    assert_eq!(flat.source_kind(), ElementKind::VectorGraphic);
    assert_eq!((flat.width(), flat.height()), (40, 20));

    let decoded = data_uri::decode_to_surface(flat.data_uri()).expect("decode");
    assert_eq!(decoded.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(decoded.pixel(30, 10), Some([0, 0, 255, 255]));
}

#[test]
fn test_svg_without_size_has_no_dimensions() {
    let mut doc =
        Document::from_html(r#"<body><svg id="s" viewBox="0 0 10 10"></svg></body>"#).expect("parse");
    let flat = Converter::new(&mut doc, "s", ConvertOptions::default()).expect("convert");
    assert_eq!((flat.width(), flat.height()), (0, 0));
    assert_eq!(flat.data_uri(), "data:,");
    assert!(flat.image().attribute("width").is_none());
}

#[test]
fn test_oversized_svg_is_rejected_before_allocating() {
    let mut doc = Document::from_html(
        r#"<body><svg id="s" width="200000" height="200000"></svg></body>"#,
    )
    .expect("parse");
    let result = Converter::new(&mut doc, "s", ConvertOptions::default());
    assert!(matches!(result, Err(RenderError::Rasterization(_))));
}

#[test]
fn test_svg_mixed_text_is_rasterized() {
    let mut doc = Document::from_html(
        r#"<body><svg id="s" width="30" height="10"><rect width="10" height="10" fill="red"></rect><text y="8">Total: <tspan>5</tspan> units</text></svg></body>"#,
    )
    .expect("parse");
    let flat = Converter::new(&mut doc, "s", ConvertOptions::default()).expect("convert");
    let decoded = data_uri::decode_to_surface(flat.data_uri()).expect("decode");
    assert_eq!(decoded.pixel(5, 5), Some([255, 0, 0, 255]));
}

#[test]
fn test_malformed_svg_reports_rasterization_error() {
    let mut doc = Document::new();
    // A space in an attribute name serializes to markup no XML parser accepts.
    let svg = doc.add_element(
        Element::new("svg")
            .with_attribute("width", 10)
            .with_attribute("height", 10)
            .with_attribute("data x", 1),
    );
    doc.append_child(doc.body(), svg).expect("append");
    let result = Converter::new(&mut doc, svg, ConvertOptions::default());
    assert!(matches!(result, Err(RenderError::Rasterization(_))));
}

// ==========================================================================
// Formats and attributes
// ==========================================================================

#[test]
fn test_format_normalization() {
    let mut doc = page();
    let cases = [
        (Some("png"), ImageFormat::Png),
        (Some("PNG"), ImageFormat::Png),
        (Some("image/png"), ImageFormat::Png),
        (Some("jpeg"), ImageFormat::Jpg),
        (Some("jpg"), ImageFormat::Jpg),
        (Some("bmp"), ImageFormat::Png),
        (None, ImageFormat::Png),
    ];
    for (token, expected) in cases {
        let options = ConvertOptions {
            format: token.map(str::to_string),
            ..ConvertOptions::default()
        };
        let flat = Converter::new(&mut doc, "plot", options).expect("convert");
        assert_eq!(flat.format(), expected, "token {token:?}");
    }
}

#[test]
fn test_src_attribute_never_wins() {
    let mut doc = page();
    let options = ConvertOptions::default()
        .with_attribute("src", "https://example.com/other.png")
        .with_attribute("class", "map")
        .with_attribute("alt", "This is a map!");
    let flat = Converter::new(&mut doc, "plot", options).expect("convert");
    assert_eq!(flat.image().src(), flat.data_uri());
    assert_eq!(flat.image().attribute("class"), Some("map"));
    assert_eq!(flat.image().attribute("alt"), Some("This is a map!"));
}

#[test]
fn test_format_given_as_attribute() {
    let mut doc = page();
    let options = ConvertOptions::default().with_attributes(Attributes::new().with("format", "webp"));
    let flat = Converter::new(&mut doc, "plot", options).expect("convert");
    assert_eq!(flat.format(), ImageFormat::WebP);
    assert!(flat.image().attribute("format").is_none());
    assert!(flat.data_uri().starts_with("data:image/webp;base64,"));
}

#[test]
fn test_caller_width_attribute_overrides_dimension() {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default().with_attribute("width", 100))
        .expect("convert");
    assert_eq!(flat.image().width(), Some(100));
    assert_eq!(flat.width(), 8);
}

// ==========================================================================
// Failures
// ==========================================================================

#[test]
fn test_missing_identifier_is_invalid_input() {
    let mut doc = page();
    let result = Converter::new(&mut doc, "nope", ConvertOptions::default());
    assert!(matches!(result, Err(RenderError::InvalidInput(_))));
}

#[test]
fn test_generic_container_is_unsupported() {
    let mut doc = page();
    let result = Converter::new(&mut doc, "title", ConvertOptions::default());
    assert!(matches!(result, Err(RenderError::UnsupportedElement(_))));
}

// ==========================================================================
// replace()
// ==========================================================================

#[test]
fn test_replace_takes_target_position() -> anyhow::Result<()> {
    let mut doc = page();
    let title = doc.get_element_by_id("title").expect("h1");
    let svg = doc.get_element_by_id("chart1").expect("svg");
    let after = doc.get_element_by_id("after").expect("p");
    let before_children = doc.children(doc.body()).len();

    let flat = Converter::new(&mut doc, "chart1", ConvertOptions::default())?;
    flat.replace(&mut doc, "chart1")?;

    assert!(!doc.is_connected(svg));
    assert!(doc.get_element_by_id("chart1").is_none());
    assert_eq!(doc.children(doc.body()).len(), before_children);

    let plot = doc.get_element_by_id("plot").expect("canvas");
    let elements = element_children(&doc, doc.body());
    let img = elements[1];
    assert_eq!(elements, vec![title, img, plot, after]);
    assert_eq!(doc.element(img).map(|e| e.tag.as_str()), Some("img"));
    assert_eq!(doc.attribute(img, "src"), Some(flat.data_uri()));
    Ok(())
}

#[test]
fn test_replace_last_child() -> anyhow::Result<()> {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default())?;
    flat.replace(&mut doc, "after")?;

    let last = *element_children(&doc, doc.body()).last().expect("child");
    assert_eq!(doc.attribute(last, "src"), Some(flat.data_uri()));
    Ok(())
}

#[test]
fn test_replace_twice_is_independent() -> anyhow::Result<()> {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default())?;
    flat.replace(&mut doc, "chart1")?.replace(&mut doc, "plot")?;

    let images: Vec<_> = doc
        .children(doc.body())
        .iter()
        .filter(|&&id| doc.attribute(id, "src") == Some(flat.data_uri()))
        .collect();
    assert_eq!(images.len(), 2);
    Ok(())
}

#[test]
fn test_replace_failures() {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default()).expect("convert");

    assert!(matches!(
        flat.replace(&mut doc, "nope"),
        Err(RenderError::InvalidInput(_))
    ));

    flat.replace(&mut doc, "after").expect("first replace");
    let after = Source::from("after");
    assert!(matches!(
        flat.replace(&mut doc, after),
        Err(RenderError::InvalidInput(_))
    ));

    let detached = doc.create_element("div");
    assert!(matches!(
        flat.replace(&mut doc, detached),
        Err(RenderError::InvalidInput(_))
    ));
}

// ==========================================================================
// download()
// ==========================================================================

#[test]
fn test_download_default_names() {
    let mut doc = page();
    let mut host = RecordingHost::new();

    let named = Converter::new(&mut doc, "chart1", ConvertOptions::default()).expect("convert");
    named.download(&mut doc, &mut host, None);

    let canvas = doc.add_element(Element::new("canvas").with_surface(Surface::new(2, 2)));
    let anonymous = Converter::new(&mut doc, canvas, ConvertOptions::default()).expect("convert");
    anonymous.download(&mut doc, &mut host, None);

    let names: Vec<_> = host.downloads.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["chart1.png", "image.png"]);
    assert_eq!(host.downloads[0].href, named.data_uri());
}

#[test]
fn test_download_leaves_page_unchanged() {
    let mut doc = page();
    let before_children = doc.children(doc.body()).to_vec();
    let before_count = doc.element_count();

    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default()).expect("convert");
    let mut host = RecordingHost::new();
    flat.download(&mut doc, &mut host, Some("plot-export.png"));

    assert_eq!(doc.children(doc.body()), before_children.as_slice());
    assert_eq!(doc.element_count(), before_count);
    assert_eq!(host.downloads[0].filename, "plot-export.png");
}

#[test]
fn test_download_falls_back_to_synthesized_click() {
    let mut doc = page();
    let flat = Converter::new(&mut doc, "plot", ConvertOptions::default().with_format("jpeg"))
        .expect("convert");
    let mut host = RecordingHost::without_native_click();
    flat.download(&mut doc, &mut host, Some(""));

    assert_eq!(host.events.len(), 1);
    assert_eq!(host.events[0].event_type, "click");
    assert_eq!(host.downloads[0].filename, "plot.jpg");
}

#[test]
fn test_download_to_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut doc = page();
    let flat = Converter::new(&mut doc, "chart1", ConvertOptions::default().with_format("webp"))?;

    let mut host = DirectoryHost::new(dir.path());
    flat.download(&mut doc, &mut host, None);

    let saved = std::fs::read(dir.path().join("chart1.webp"))?;
    assert_eq!(ImageFormat::from_magic_bytes(&saved), Some(ImageFormat::WebP));
    Ok(())
}
