//! services/portal/src/adapters/roster_image.rs
//!
//! Rasterises the roster diagram: the base image scaled onto the fixed canvas,
//! with each assigned name drawn at its slot's coordinate.

use ab_glyph::{FontArc, PxScale};
use image::{imageops::FilterType, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use ministry_core::roster::layout::line_offset;
use ministry_core::roster::{RosterComposer, CANVAS_HEIGHT, CANVAS_WIDTH};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

use crate::error::PortalError;

const FONT_SIZE: f32 = 18.0;
const TEXT_COLOR: Rgba<u8> = Rgba([20, 20, 20, 255]);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct RosterImageRenderer {
    base: RgbaImage,
    font: FontArc,
    scale: PxScale,
}

impl RosterImageRenderer {
    pub fn new(base: DynamicImage, font: FontArc) -> Self {
        Self {
            base: fit_canvas(base),
            font,
            scale: PxScale::from(FONT_SIZE),
        }
    }

    /// Loads the base diagram and the label font from disk.
    pub fn load(base_path: &Path, font_path: &Path) -> Result<Self, PortalError> {
        let base = image::open(base_path)?;
        let font_bytes = std::fs::read(font_path)?;
        let font = FontArc::try_from_vec(font_bytes).map_err(|e| {
            PortalError::Internal(format!("Invalid font {}: {}", font_path.display(), e))
        })?;
        info!(
            "Roster diagram loaded from {} ({}x{} canvas)",
            base_path.display(),
            CANVAS_WIDTH,
            CANVAS_HEIGHT
        );
        Ok(Self::new(base, font))
    }

    /// Rendered width of `text` in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        text_size(self.scale, &self.font, text).0
    }

    pub fn render(&self, composer: &RosterComposer) -> RgbaImage {
        let mut canvas = self.base.clone();
        for placement in composer.placements(|text| self.measure(text)) {
            for (n, line) in placement.lines.iter().enumerate() {
                let y = placement.y + line_offset(n);
                draw_text_mut(
                    &mut canvas,
                    TEXT_COLOR,
                    placement.x as i32,
                    y as i32,
                    self.scale,
                    &self.font,
                    line,
                );
            }
        }
        canvas
    }

    pub fn render_png(&self, composer: &RosterComposer) -> Result<Vec<u8>, image::ImageError> {
        encode_png(&self.render(composer))
    }
}

/// Scales the base diagram to exactly the canvas size.
pub fn fit_canvas(base: DynamicImage) -> RgbaImage {
    if base.width() == CANVAS_WIDTH && base.height() == CANVAS_HEIGHT {
        return base.to_rgba8();
    }
    base.resize_exact(CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Triangle)
        .to_rgba8()
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ministry_core::roster::catalog::slot_index;
    use ministry_core::roster::SLOTS;

    #[test]
    fn base_image_is_scaled_to_the_canvas() {
        let small = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([255; 4])));
        let fitted = fit_canvas(small);
        assert_eq!(fitted.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    const FONT: &[u8] = include_bytes!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/DejaVuSans.ttf"
    ));

    fn renderer() -> RosterImageRenderer {
        let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Rgba([255; 4]),
        ));
        let font = FontArc::try_from_slice(FONT).unwrap();
        RosterImageRenderer::new(base, font)
    }

    fn inked_pixels(image: &RgbaImage, x: u32, y: u32, w: u32, h: u32) -> usize {
        (y..y + h)
            .flat_map(|py| (x..x + w).map(move |px| (px, py)))
            .filter(|&(px, py)| image.get_pixel(px, py).0 != [255; 4])
            .count()
    }

    #[test]
    fn names_are_drawn_at_their_slot_only() {
        let renderer = renderer();
        let escada = slot_index("escada").unwrap();
        let galeria = slot_index("galeria").unwrap();
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_slot(escada, "Maria").unwrap();

        let image = renderer.render(&composer);
        let (ex, ey) = (SLOTS[escada].x, SLOTS[escada].y);
        let (gx, gy) = (SLOTS[galeria].x, SLOTS[galeria].y);

        assert!(inked_pixels(&image, ex, ey, 120, 22) > 0);
        assert_eq!(inked_pixels(&image, gx, gy, 120, 22), 0);
    }

    #[test]
    fn empty_roster_renders_the_bare_base() {
        let renderer = renderer();
        let image = renderer.render(&RosterComposer::new("Obreiros"));
        assert_eq!(inked_pixels(&image, 0, 0, CANVAS_WIDTH, CANVAS_HEIGHT), 0);
    }

    #[test]
    fn measure_grows_with_text() {
        let renderer = renderer();
        assert!(renderer.measure("Maria") > 0);
        assert!(renderer.measure("Maria Aparecida") > renderer.measure("Maria"));
    }

    #[test]
    fn png_export_round_trips_dimensions() {
        let canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([240, 240, 240, 255]));
        let bytes = encode_png(&canvas).unwrap();

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }
}
