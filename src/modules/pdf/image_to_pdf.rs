use flate2::{write::ZlibEncoder, Compression};
use image::{DynamicImage, ImageFormat, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{Cursor, Write};

use super::{PdfError, Result};

/// Decoded pixels ready to be embedded as an image XObject
struct RasterPage {
    width: u32,
    height: u32,
    color_space: &'static str,
    pixels: Vec<u8>,
}

/// Render a PNG or JPEG image into a one-page PDF.
///
/// The page is exactly the image size at 72 dpi. Transparency is flattened
/// onto white; grayscale images stay grayscale.
pub fn image_to_pdf(data: &[u8]) -> Result<Vec<u8>> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

    match reader.format() {
        Some(ImageFormat::Png) | Some(ImageFormat::Jpeg) => {}
        Some(other) => {
            return Err(PdfError::UnsupportedImage(format!(
                "{:?} images cannot be converted",
                other
            )))
        }
        None => {
            return Err(PdfError::UnsupportedImage(
                "unrecognized image data".to_string(),
            ))
        }
    }

    let page = rasterize(reader.decode()?);
    if page.width == 0 || page.height == 0 {
        return Err(PdfError::UnsupportedImage("image has no pixels".to_string()));
    }

    build_document(page)
}

fn rasterize(img: DynamicImage) -> RasterPage {
    let (width, height) = (img.width(), img.height());
    let color = img.color();

    let (color_space, pixels) = match (color.has_color(), color.has_alpha()) {
        (false, false) => ("DeviceGray", img.to_luma8().into_raw()),
        (false, true) => (
            "DeviceGray",
            img.to_luma_alpha8()
                .pixels()
                .map(|p| over_white(p[0], p[1]))
                .collect(),
        ),
        (true, false) => ("DeviceRGB", img.to_rgb8().into_raw()),
        (true, true) => (
            "DeviceRGB",
            img.to_rgba8()
                .pixels()
                .flat_map(|p| {
                    let alpha = p[3];
                    [
                        over_white(p[0], alpha),
                        over_white(p[1], alpha),
                        over_white(p[2], alpha),
                    ]
                })
                .collect(),
        ),
    };

    RasterPage {
        width,
        height,
        color_space,
        pixels,
    }
}

/// Composite one channel over a white background
fn over_white(value: u8, alpha: u8) -> u8 {
    let (value, alpha) = (u32::from(value), u32::from(alpha));
    ((value * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn build_document(page: RasterPage) -> Result<Vec<u8>> {
    let width = i64::from(page.width);
    let height = i64::from(page.height);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => page.color_space,
            "BitsPerComponent" => 8i64,
            "Filter" => "FlateDecode",
        },
        deflate(&page.pixels)?,
    );
    let image_id = doc.add_object(image);

    // Scale the unit square onto the whole page and paint the image
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0i64.into(),
                    0i64.into(),
                    height.into(),
                    0i64.into(),
                    0i64.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0i64.into(), 0i64.into(), width.into(), height.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
