use std::{io::Cursor, sync::Arc};

use anyhow::Context;

use crate::{
    assets::decode::{PreparedImage, decode_source},
    assets::source::ImageSource,
    foundation::core::{Rgba8, Size},
    foundation::error::{OverlayError, OverlayResult},
    layout::variant::LayoutVariant,
    render::cpu::{CpuSurface, FrameRgba},
};

/// A finished composite, PNG-encoded in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG file bytes.
    pub png: Arc<Vec<u8>>,
}

impl RenderedImage {
    /// Decode the PNG payload back into straight-alpha RGBA8 pixels.
    pub fn to_rgba(&self) -> OverlayResult<FrameRgba> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .context("decode rendered png")?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(FrameRgba {
            width,
            height,
            data: img.into_raw(),
        })
    }
}

/// Renders (primary, secondary) pairs into composites.
///
/// The orchestrator prepares every distinct source once, then composes each pair from the
/// prepared values. Both steps run concurrently on worker threads and must give identical output
/// for identical inputs.
pub trait Compositor: Sync {
    /// Per-source state shared read-only by every pair that uses the source.
    type Prepared: Send + Sync;

    /// Load and decode one source.
    fn prepare(&self, source: &ImageSource) -> OverlayResult<Self::Prepared>;

    /// Composite `primary` and `secondary` using `variant`.
    fn compose(
        &self,
        primary: &Self::Prepared,
        secondary: &Self::Prepared,
        variant: LayoutVariant,
    ) -> OverlayResult<RenderedImage>;
}

/// Default compositor: decodes to premultiplied RGBA8 and rasterizes on the CPU.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuCompositor;

impl Compositor for CpuCompositor {
    type Prepared = PreparedImage;

    fn prepare(&self, source: &ImageSource) -> OverlayResult<PreparedImage> {
        decode_source(source)
    }

    fn compose(
        &self,
        primary: &PreparedImage,
        secondary: &PreparedImage,
        variant: LayoutVariant,
    ) -> OverlayResult<RenderedImage> {
        render_prepared(primary, secondary, variant)
    }
}

/// Decode two sources and composite them on a fresh canvas.
///
/// Fails with [`OverlayError::Decode`] if either source cannot be read or decoded, and with
/// [`OverlayError::CanvasUnavailable`] if the drawing surface cannot be created.
#[tracing::instrument(
    skip_all,
    fields(primary = primary.name(), secondary = secondary.name(), variant = %variant)
)]
pub fn render(
    primary: &ImageSource,
    secondary: &ImageSource,
    variant: LayoutVariant,
) -> OverlayResult<RenderedImage> {
    let primary = decode_source(primary)?;
    let secondary = decode_source(secondary)?;
    render_prepared(&primary, &secondary, variant)
}

/// Composite two already-decoded images.
#[tracing::instrument(
    skip_all,
    fields(primary_w = primary.width, primary_h = primary.height, variant = %variant)
)]
pub fn render_prepared(
    primary: &PreparedImage,
    secondary: &PreparedImage,
    variant: LayoutVariant,
) -> OverlayResult<RenderedImage> {
    let frame = rasterize(primary, secondary, variant)?;
    encode_png(&frame)
}

pub(crate) fn rasterize(
    primary: &PreparedImage,
    secondary: &PreparedImage,
    variant: LayoutVariant,
) -> OverlayResult<FrameRgba> {
    let plan = variant.plan(image_size(primary), image_size(secondary));
    tracing::debug!(
        canvas_w = plan.canvas.width,
        canvas_h = plan.canvas.height,
        primary = ?plan.primary,
        secondary = ?plan.secondary,
        "layout planned"
    );

    let mut surface = CpuSurface::new(plan.canvas)?;
    surface.fill(Rgba8::WHITE);
    surface.draw_image(primary, plan.primary)?;
    surface.draw_image(secondary, plan.secondary)?;
    Ok(surface.finish())
}

fn image_size(image: &PreparedImage) -> Size {
    Size::new(f64::from(image.width), f64::from(image.height))
}

fn encode_png(frame: &FrameRgba) -> OverlayResult<RenderedImage> {
    let mut png = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &frame.data,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| OverlayError::Other(anyhow::anyhow!("encode composite png: {e}")))?;

    Ok(RenderedImage {
        width: frame.width,
        height: frame.height,
        png: Arc::new(png),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
