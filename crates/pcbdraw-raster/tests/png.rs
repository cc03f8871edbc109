use image::{GenericImageView, Rgba};
use pcbdraw_core::Bounds;
use pcbdraw_raster::{canvas_size, RasterError, Rasterizer, SkiaRasterizer};
use pcbdraw_svg::{Document, Element};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// A 25.4 x 12.7 mm document: 100 x 50 px at 100 dpi.
fn doc() -> Document {
    Document::new(Bounds::new(0.0, 0.0, 25.4, 12.7))
}

fn full_rect(style: &str) -> Element {
    Element::new("rect")
        .with_attr("width", "25.4")
        .with_attr("height", "12.7")
        .with_attr("style", style)
}

fn render(doc: &Document) -> image::DynamicImage {
    let png = SkiaRasterizer.rasterize(doc, 100).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    image::load_from_memory(&png).unwrap()
}

#[test]
fn size_follows_millimetres_and_dpi() {
    let img = render(&doc());
    assert_eq!(img.dimensions(), (100, 50));
    assert_eq!(canvas_size(&doc(), 300), (300, 150));
}

#[test]
fn background_is_transparent() {
    let img = render(&doc());
    assert_eq!(img.get_pixel(50, 25)[3], 0);
}

#[test]
fn fills_use_the_inherited_color() {
    let mut d = doc();
    d.body.push(
        Element::new("g")
            .with_attr("style", "fill:#ff0000")
            .with_child(full_rect("")),
    );
    let img = render(&d);
    assert_eq!(img.get_pixel(50, 25), Rgba([255, 0, 0, 255]));
}

#[test]
fn hidden_elements_are_skipped() {
    let mut d = doc();
    d.body.push(full_rect("fill:#00ff00;display:none"));
    assert_eq!(render(&d).get_pixel(50, 25)[3], 0);
}

#[test]
fn group_opacity_applies_once() {
    let mut d = doc();
    d.body.push(
        Element::new("g")
            .with_attr("opacity", "0.5")
            .with_child(full_rect("fill:#0000ff"))
            .with_child(full_rect("fill:#0000ff")),
    );
    let alpha = render(&d).get_pixel(50, 25)[3];
    assert!((126..=129).contains(&alpha), "alpha {alpha}");
}

#[test]
fn mask_cuts_a_transparent_hole() {
    let mut d = doc();
    d.defs.push(
        Element::new("mask")
            .with_attr("id", "hole-mask")
            .with_child(full_rect("fill:#ffffff"))
            .with_child(
                Element::new("circle")
                    .with_attr("cx", "12.7")
                    .with_attr("cy", "6.35")
                    .with_attr("r", "2")
                    .with_attr("fill", "#000000"),
            ),
    );
    d.body.push(
        Element::new("g")
            .with_attr("mask", "url(#hole-mask)")
            .with_child(full_rect("fill:#ff0000")),
    );
    let img = render(&d);
    assert_eq!(img.get_pixel(50, 25)[3], 0);
    assert_eq!(img.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
}

#[test]
fn clip_path_limits_drawing() {
    let mut d = doc();
    d.defs.push(
        Element::new("clipPath").with_attr("id", "cut-off").with_child(
            Element::new("rect")
                .with_attr("width", "12.7")
                .with_attr("height", "12.7"),
        ),
    );
    d.body.push(
        Element::new("g")
            .with_attr("clip-path", "url(#cut-off)")
            .with_child(full_rect("fill:#ff0000")),
    );
    let img = render(&d);
    assert_eq!(img.get_pixel(10, 25)[3], 255);
    assert_eq!(img.get_pixel(90, 25)[3], 0);
}

#[test]
fn use_elements_draw_their_target() {
    let mut d = doc();
    d.defs.push(
        Element::new("rect")
            .with_attr("id", "dot")
            .with_attr("width", "2.54")
            .with_attr("height", "2.54")
            .with_attr("fill", "#00ff00"),
    );
    d.body.push(
        Element::new("use")
            .with_attr("href", "#dot")
            .with_attr("x", "12.7")
            .with_attr("y", "2.54"),
    );
    let img = render(&d);
    assert_eq!(img.get_pixel(55, 15), Rgba([0, 255, 0, 255]));
    assert_eq!(img.get_pixel(5, 5)[3], 0);
}

#[test]
fn transforms_and_strokes_are_honoured() {
    let mut d = doc();
    d.body.push(
        Element::new("g")
            .with_attr("transform", "translate(12.7 6.35)")
            .with_child(
                Element::new("path")
                    .with_attr("d", "M -10 0 L 10 0")
                    .with_attr("style", "fill:none;stroke:#000000;stroke-width:1"),
            ),
    );
    let img = render(&d);
    assert_eq!(img.get_pixel(50, 25)[3], 255);
    assert_eq!(img.get_pixel(50, 5)[3], 0);
}

#[test]
fn zero_dpi_is_rejected() {
    assert!(matches!(
        SkiaRasterizer.rasterize(&doc(), 0),
        Err(RasterError::InvalidDpi(0))
    ));
}
