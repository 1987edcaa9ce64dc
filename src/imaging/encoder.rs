//! Serializes rasters to bytes in the requested output format.
//!
//! ## Crate mapping
//!
//! | Format | Encoder | Parameters |
//! |---|---|---|
//! | PNG | `image::codecs::png` | lossless; `optimize` selects best compression + adaptive filtering |
//! | JPEG | `image::codecs::jpeg` | quality 1-100; alpha composited onto the opaque background |
//! | WebP | `webp` (libwebp) | lossy, quality 1-100, method 6 (best compression) |
//! | ICO | `image::codecs::ico` | single entry at the raster's size, at most 256x256 |
//! | BMP | `image::codecs::bmp` | uncompressed |
//! | TIFF | `tiff` | LZW compression |
//!
//! Quality is ignored by the lossless formats. Only pixel content and
//! dimensions are stable; encoded bytes may change between codec versions.
//!
//! An EXIF block passed in [`EncodeOptions::exif`] is embedded in PNG (`eXIf`),
//! JPEG (APP1), and WebP (`EXIF` chunk, promoting the file to the extended
//! `VP8X` layout). ICO, BMP, and TIFF outputs drop it.

use super::params::{Background, OutputFormat, Quality};
use super::raster::Raster;
use crate::error::OptimizeError;
use image::codecs::bmp::BmpEncoder;
use image::codecs::ico::IcoEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageEncoder, RgbImage, RgbaImage, imageops};
use std::borrow::Cow;
use std::io::Cursor;

/// Largest edge an ICO entry can hold.
pub const ICO_MAX_EDGE: u32 = 256;

/// WebP `method` knob: 0 = fastest, 6 = slowest / smallest.
const WEBP_METHOD: i32 = 6;

/// Format-independent encoding knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions<'a> {
    pub quality: Quality,
    /// Backdrop for flattening alpha into JPEG. Only its color channels are used.
    pub background: Background,
    /// Spend extra effort on smaller PNGs.
    pub optimize: bool,
    /// Raw EXIF (TIFF-structured, no `Exif\0\0` prefix) to embed.
    pub exif: Option<&'a [u8]>,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            background: Background::WHITE,
            optimize: true,
            exif: None,
        }
    }
}

/// Encode `raster` as `format` at `quality`, with default options otherwise.
pub fn encode(
    raster: &Raster,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, OptimizeError> {
    encode_with(
        raster,
        format,
        &EncodeOptions {
            quality,
            ..EncodeOptions::default()
        },
    )
}

/// Encode `raster` as `format`.
pub fn encode_with(
    raster: &Raster,
    format: OutputFormat,
    options: &EncodeOptions<'_>,
) -> Result<Vec<u8>, OptimizeError> {
    let image = working_image(raster);
    let bytes = match format {
        OutputFormat::Png => encode_png(&image, options.optimize, options.exif),
        OutputFormat::Jpeg => encode_jpeg(&image, options.quality, options.background, options.exif),
        OutputFormat::Webp => encode_webp(&image, options.quality).and_then(|webp| match options.exif {
            Some(exif) => attach_webp_exif(webp, exif, raster.dimensions()),
            None => Ok(webp),
        }),
        OutputFormat::Ico => encode_ico(&image),
        OutputFormat::Bmp => encode_bmp(&image),
        OutputFormat::Tiff => encode_tiff(&image),
    }?;
    tracing::debug!(
        %format,
        width = raster.width(),
        height = raster.height(),
        bytes = bytes.len(),
        "encoded"
    );
    Ok(bytes)
}

/// Borrow RGB8/RGBA8 rasters as-is; convert anything else.
fn working_image(raster: &Raster) -> Cow<'_, DynamicImage> {
    match raster.image() {
        img @ (DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)) => Cow::Borrowed(img),
        _ => Cow::Owned(raster.normalized().into_image()),
    }
}

fn encode_png(
    image: &DynamicImage,
    optimize: bool,
    exif: Option<&[u8]>,
) -> Result<Vec<u8>, OptimizeError> {
    let mut buf = Vec::new();
    let mut encoder = if optimize {
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
    } else {
        PngEncoder::new(&mut buf)
    };
    if let Some(exif) = exif {
        encoder
            .set_exif_metadata(exif.to_vec())
            .map_err(|e| OptimizeError::encode("png", e))?;
    }
    image
        .write_with_encoder(encoder)
        .map_err(|e| OptimizeError::encode("png", e))?;
    Ok(buf)
}

/// Composite any alpha onto an opaque `background`.
fn flatten(image: &DynamicImage, background: Background) -> RgbImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => {
            let [r, g, b, _] = background.0;
            let mut base =
                RgbaImage::from_pixel(rgba.width(), rgba.height(), image::Rgba([r, g, b, 255]));
            imageops::overlay(&mut base, rgba, 0, 0);
            DynamicImage::ImageRgba8(base).to_rgb8()
        }
        other => other.to_rgb8(),
    }
}

fn encode_jpeg(
    image: &DynamicImage,
    quality: Quality,
    background: Background,
    exif: Option<&[u8]>,
) -> Result<Vec<u8>, OptimizeError> {
    let rgb = flatten(image, background);
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
    if let Some(exif) = exif {
        encoder
            .set_exif_metadata(exif.to_vec())
            .map_err(|e| OptimizeError::encode("jpeg", e))?;
    }
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| OptimizeError::encode("jpeg", e))?;
    Ok(buf)
}

fn encode_webp(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, OptimizeError> {
    let (w, h) = (image.width(), image.height());
    let rgb;
    let encoder = match image {
        DynamicImage::ImageRgba8(rgba) => webp::Encoder::from_rgba(rgba.as_raw(), w, h),
        other => {
            rgb = other.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), w, h)
        }
    };

    let mut config = webp::WebPConfig::new()
        .map_err(|_| OptimizeError::encode("webp", "failed to create WebPConfig"))?;
    config.quality = quality.value() as f32;
    config.method = WEBP_METHOD;

    let mem = encoder
        .encode_advanced(&config)
        .map_err(|e| OptimizeError::encode("webp", format!("{e:?}")))?;
    Ok(mem.to_vec())
}

/// Wrap a simple-layout WebP file in `VP8X` (if needed) and append an `EXIF` chunk.
///
/// libwebp's one-shot encoder cannot mux metadata, so the RIFF container is
/// rewritten here: `RIFF <size> WEBP VP8X ... <image chunks> EXIF`.
/// `(width, height)` is the canvas size recorded in `VP8X`.
fn attach_webp_exif(
    webp: Vec<u8>,
    exif: &[u8],
    (width, height): (u32, u32),
) -> Result<Vec<u8>, OptimizeError> {
    const EXIF_FLAG: u8 = 0x08;
    const ALPHA_FLAG: u8 = 0x10;

    if webp.len() < 20 || &webp[0..4] != b"RIFF" || &webp[8..12] != b"WEBP" {
        return Err(OptimizeError::encode("webp", "encoder produced no RIFF container"));
    }
    let mut chunks = webp[12..].to_vec();

    if &chunks[0..4] == b"VP8X" {
        chunks[8] |= EXIF_FLAG;
    } else {
        // Lossy VP8 has no alpha; VP8L records it in bit 28 of its header word.
        let lossless_alpha = &chunks[0..4] == b"VP8L"
            && chunks.len() >= 13
            && chunks[8] == 0x2f
            && (u32::from_le_bytes([chunks[9], chunks[10], chunks[11], chunks[12]]) >> 28) & 1 == 1;
        let flags = if lossless_alpha {
            EXIF_FLAG | ALPHA_FLAG
        } else {
            EXIF_FLAG
        };
        let mut vp8x = Vec::with_capacity(18);
        vp8x.extend_from_slice(b"VP8X");
        vp8x.extend_from_slice(&10u32.to_le_bytes());
        vp8x.extend_from_slice(&[flags, 0, 0, 0]);
        vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
        vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
        chunks.splice(0..0, vp8x);
    }

    let exif_len = u32::try_from(exif.len())
        .map_err(|_| OptimizeError::encode("webp", "EXIF block too large"))?;
    chunks.extend_from_slice(b"EXIF");
    chunks.extend_from_slice(&exif_len.to_le_bytes());
    chunks.extend_from_slice(exif);
    if exif.len() % 2 == 1 {
        chunks.push(0);
    }

    let riff_len = u32::try_from(chunks.len() + 4)
        .map_err(|_| OptimizeError::encode("webp", "output too large"))?;
    let mut out = Vec::with_capacity(chunks.len() + 12);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WEBP");
    out.extend_from_slice(&chunks);
    Ok(out)
}

fn encode_ico(image: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
    if image.width() > ICO_MAX_EDGE || image.height() > ICO_MAX_EDGE {
        return Err(OptimizeError::encode(
            "ico",
            format!(
                "{}x{} exceeds the {ICO_MAX_EDGE}x{ICO_MAX_EDGE} ICO limit",
                image.width(),
                image.height()
            ),
        ));
    }
    let mut buf = Vec::new();
    image
        .write_with_encoder(IcoEncoder::new(&mut buf))
        .map_err(|e| OptimizeError::encode("ico", e))?;
    Ok(buf)
}

fn encode_bmp(image: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(BmpEncoder::new(&mut buf))
        .map_err(|e| OptimizeError::encode("bmp", e))?;
    Ok(buf)
}

fn encode_tiff(image: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
    use tiff::encoder::{TiffEncoder, colortype, compression::Lzw};

    let (w, h) = (image.width(), image.height());
    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = TiffEncoder::new(&mut cursor).map_err(|e| OptimizeError::encode("tiff", e))?;
    match image {
        DynamicImage::ImageRgba8(rgba) => encoder
            .write_image_with_compression::<colortype::RGBA8, _>(w, h, Lzw::default(), rgba.as_raw()),
        other => {
            let rgb = other.to_rgb8();
            encoder.write_image_with_compression::<colortype::RGB8, _>(
                w,
                h,
                Lzw::default(),
                rgb.as_raw(),
            )
        }
    }
    .map_err(|e| OptimizeError::encode("tiff", e))?;
    drop(encoder);
    Ok(cursor.into_inner())
}
