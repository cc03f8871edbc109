//! Bitmap output for composited board documents.

mod draw;

use pcbdraw_core::Affine;
use pcbdraw_svg::Document;
use tiny_skia::Pixmap;

use draw::Canvas;

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("invalid resolution: {0} dpi")]
    InvalidDpi(u32),
    #[error("failed to create pixmap with dimensions {width}x{height}")]
    PixmapCreation { width: u32, height: u32 },
    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// Turns a document into encoded image bytes.
pub trait Rasterizer {
    fn rasterize(&self, document: &Document, dpi: u32) -> Result<Vec<u8>, RasterError>;
}

/// PNG output through tiny-skia.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaRasterizer;

impl Rasterizer for SkiaRasterizer {
    fn rasterize(&self, document: &Document, dpi: u32) -> Result<Vec<u8>, RasterError> {
        let pixmap = render_document(document, dpi)?;
        encode_png(&pixmap)
    }
}

/// Pixel size of the document at `dpi`; never smaller than 1x1.
pub fn canvas_size(document: &Document, dpi: u32) -> (u32, u32) {
    let px = |mm: f64| (mm * f64::from(dpi) / MM_PER_INCH).round().max(1.0) as u32;
    (px(document.width_mm()), px(document.height_mm()))
}

/// Renders the document onto a transparent pixmap.
pub fn render_document(document: &Document, dpi: u32) -> Result<Pixmap, RasterError> {
    if dpi == 0 {
        return Err(RasterError::InvalidDpi(dpi));
    }
    let (width, height) = canvas_size(document, dpi);
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RasterError::PixmapCreation { width, height })?;

    let vb = &document.view_box;
    let sx = f64::from(width) / document.width_mm().max(f64::MIN_POSITIVE);
    let sy = f64::from(height) / document.height_mm().max(f64::MIN_POSITIVE);
    let root = Affine::scale(sx, sy) * Affine::translate(-vb.min_x, -vb.min_y);

    Canvas::new(document, width, height).paint(&mut pixmap, &root);
    tracing::debug!(width, height, dpi, "document rasterized");
    Ok(pixmap)
}

/// PNG bytes with straight alpha.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RasterError> {
    use image::{ImageBuffer, Rgba};

    let width = pixmap.width();
    let height = pixmap.height();
    let pixels = pixmap.pixels();

    // tiny-skia stores premultiplied alpha
    let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let c = pixels[(y * width + x) as usize].demultiply();
        *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut buf = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buf);
    img.write_to(&mut cursor, image::ImageFormat::Png)?;
    Ok(buf)
}
