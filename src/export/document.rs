//! Paginated document export of a rendered report surface.
//!
//! Rendering the surface to pixels and encoding the final document are
//! external concerns behind [`Rasterizer`] and [`DocumentEncoder`]. This
//! module only slices the bitmap into fixed-height pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, Result};

/// A4 page width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 page height in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Opaque handle to the report surface currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub id: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl RenderTarget {
    pub fn is_visible(&self) -> bool {
        self.width_px > 0 && self.height_px > 0
    }
}

/// Bitmap produced by a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    /// Encoded image data (PNG).
    pub data: Vec<u8>,
}

/// Renders a surface to a bitmap.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, target: &RenderTarget) -> Result<RasterImage>;
}

/// Encodes a paginated document to its final byte format.
pub trait DocumentEncoder {
    fn encode(&self, document: &PaginatedDocument) -> Result<Vec<u8>>;
}

/// Physical page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4(0.0)
    }
}

impl PageLayout {
    /// Portrait A4 with equal margins on every side.
    pub fn a4(margin_mm: f64) -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            margin_mm,
        }
    }

    pub fn content_width_mm(&self) -> f64 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f64 {
        self.height_mm - 2.0 * self.margin_mm
    }

    /// Height of one page in source pixels when the image is scaled to the content width.
    pub fn page_height_px(&self, image_width_px: u32) -> f64 {
        self.content_height_mm() * f64::from(image_width_px) / self.content_width_mm()
    }
}

/// One page: which band of source pixels it shows and where the image is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub index: usize,
    pub source_y_px: u32,
    pub source_height_px: u32,
    /// Vertical image offset on the page (zero or negative), in millimetres.
    pub offset_mm: f64,
}

/// Bitmap plus its page slices, ready for an encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedDocument {
    pub layout: PageLayout,
    pub image: RasterImage,
    pub pages: Vec<PageSlice>,
}

/// Slice an image of the given size into `ceil(height / page_height)` pages.
pub fn paginate(width_px: u32, height_px: u32, layout: &PageLayout) -> Vec<PageSlice> {
    if width_px == 0 || height_px == 0 {
        return Vec::new();
    }

    let page_px = layout.page_height_px(width_px);
    let mm_per_px = layout.content_width_mm() / f64::from(width_px);
    // Tolerance keeps an exact multiple of the page height from spilling onto an extra page.
    let count = ((f64::from(height_px) / page_px) - 1e-9).ceil().max(1.0) as usize;

    (0..count)
        .map(|index| {
            let start = ((index as f64) * page_px).round() as u32;
            let end = (((index + 1) as f64) * page_px).round().min(f64::from(height_px)) as u32;
            PageSlice {
                index,
                source_y_px: start,
                source_height_px: end.saturating_sub(start),
                offset_mm: -(f64::from(start) * mm_per_px),
            }
        })
        .collect()
}

/// Render `target`, paginate the bitmap and encode the document.
///
/// Fails with `ExportTargetNotFound` when there is no surface,
/// `ExportNotReady` when it has no size yet and `ExportRenderFailure` when
/// the rasterizer fails or renders nothing.
pub async fn export_document<R, E>(
    rasterizer: &R,
    encoder: &E,
    target: Option<&RenderTarget>,
    layout: &PageLayout,
) -> Result<Vec<u8>>
where
    R: Rasterizer,
    E: DocumentEncoder,
{
    let target = target.ok_or_else(|| AppError::target_not_found("no report surface to export"))?;
    if !target.is_visible() {
        return Err(AppError::not_ready(format!("surface '{}' has no size yet", target.id)));
    }
    if layout.content_width_mm() <= 0.0 || layout.content_height_mm() <= 0.0 {
        return Err(AppError::render_failure("page margins leave no printable area"));
    }

    let image = rasterizer.rasterize(target).await.map_err(|e| match e {
        AppError::ExportRenderFailure(_) | AppError::ExportTargetNotFound(_) | AppError::ExportNotReady(_) => e,
        other => {
            warn!("Rasterizer failed for '{}': {other}", target.id);
            AppError::render_failure(other.to_string())
        }
    })?;

    let pages = paginate(image.width_px, image.height_px, layout);
    if pages.is_empty() {
        return Err(AppError::render_failure(format!("surface '{}' rendered empty", target.id)));
    }

    info!(
        "Rendered '{}' at {}x{} px into {} page(s)",
        target.id,
        image.width_px,
        image.height_px,
        pages.len()
    );

    let document = PaginatedDocument {
        layout: *layout,
        image,
        pages,
    };
    encoder.encode(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRasterizer {
        width_px: u32,
        height_px: u32,
    }

    #[async_trait]
    impl Rasterizer for FixedRasterizer {
        async fn rasterize(&self, _target: &RenderTarget) -> Result<RasterImage> {
            Ok(RasterImage {
                width_px: self.width_px,
                height_px: self.height_px,
                data: vec![0x89, b'P', b'N', b'G'],
            })
        }
    }

    struct FailingRasterizer;

    #[async_trait]
    impl Rasterizer for FailingRasterizer {
        async fn rasterize(&self, _target: &RenderTarget) -> Result<RasterImage> {
            Err(AppError::parse("unsupported color function"))
        }
    }

    /// Encodes the page count as a single byte.
    struct PageCountEncoder;

    impl DocumentEncoder for PageCountEncoder {
        fn encode(&self, document: &PaginatedDocument) -> Result<Vec<u8>> {
            Ok(vec![document.pages.len() as u8])
        }
    }

    fn target(height_px: u32) -> RenderTarget {
        RenderTarget {
            id: "report".to_string(),
            width_px: 210,
            height_px,
        }
    }

    #[test]
    fn test_page_height_scales_with_width() {
        let layout = PageLayout::a4(0.0);
        assert!((layout.page_height_px(210) - 297.0).abs() < 1e-9);
        assert!((layout.page_height_px(420) - 594.0).abs() < 1e-9);

        let margins = PageLayout::a4(10.0);
        assert!((margins.page_height_px(190) - 277.0).abs() < 1e-9);
    }

    #[test]
    fn test_paginate_page_counts() {
        let layout = PageLayout::a4(0.0);
        assert_eq!(paginate(210, 1, &layout).len(), 1);
        assert_eq!(paginate(210, 297, &layout).len(), 1);
        assert_eq!(paginate(210, 298, &layout).len(), 2);
        assert_eq!(paginate(210, 594, &layout).len(), 2);
        assert_eq!(paginate(210, 10_000, &layout).len(), 34);
        assert!(paginate(210, 0, &layout).is_empty());
    }

    #[test]
    fn test_paginate_slices_cover_image() {
        let layout = PageLayout::a4(12.5);
        let (width, height) = (1240, 9001);
        let pages = paginate(width, height, &layout);

        let expected = (f64::from(height) / layout.page_height_px(width)).ceil() as usize;
        assert_eq!(pages.len(), expected);
        assert_eq!(pages[0].source_y_px, 0);
        assert_eq!(pages[0].offset_mm, 0.0);

        let covered: u32 = pages.iter().map(|p| p.source_height_px).sum();
        assert_eq!(covered, height);
        for pair in pages.windows(2) {
            assert_eq!(pair[0].source_y_px + pair[0].source_height_px, pair[1].source_y_px);
            assert!(pair[1].offset_mm < pair[0].offset_mm);
        }
    }

    #[tokio::test]
    async fn test_export_document_paginates() {
        let rasterizer = FixedRasterizer {
            width_px: 210,
            height_px: 700,
        };
        let bytes = export_document(&rasterizer, &PageCountEncoder, Some(&target(700)), &PageLayout::default())
            .await
            .unwrap();
        assert_eq!(bytes, [3]);
    }

    #[tokio::test]
    async fn test_export_document_without_target() {
        let rasterizer = FixedRasterizer {
            width_px: 210,
            height_px: 10,
        };
        let err = export_document(&rasterizer, &PageCountEncoder, None, &PageLayout::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExportTargetNotFound(_)));
    }

    #[tokio::test]
    async fn test_export_document_invisible_target() {
        let rasterizer = FixedRasterizer {
            width_px: 210,
            height_px: 10,
        };
        let err = export_document(&rasterizer, &PageCountEncoder, Some(&target(0)), &PageLayout::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExportNotReady(_)));
        assert_eq!(err.user_message(), "ข้อมูลยังไม่พร้อม กรุณารอสักครู่แล้วลองใหม่");
    }

    #[tokio::test]
    async fn test_export_document_rasterizer_failure() {
        let err = export_document(&FailingRasterizer, &PageCountEncoder, Some(&target(10)), &PageLayout::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExportRenderFailure(_)));
    }
}
