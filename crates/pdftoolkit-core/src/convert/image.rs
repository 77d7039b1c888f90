//! Image conversions
//!
//! Image → PDF places the picture on a page of the same size. PDF → Image
//! pulls out the first embedded image XObject; pages are never rasterized.

use crate::compress::compress_stream;
use crate::error::ToolkitError;
use crate::save_document;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;
use tracing::debug;

/// Guard against cyclic page trees when looking up inherited resources
const MAX_TREE_DEPTH: usize = 32;

/// Put a JPEG or PNG on a single page sized 1 pt per pixel
pub fn image_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let format = image::guess_format(bytes)
        .map_err(|e| ToolkitError::ConversionError(format!("Unrecognized image: {}", e)))?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ToolkitError::ConversionError(format!("Failed to decode image: {}", e)))?;

    let (width, height) = (img.width(), img.height());
    let image_stream = image_xobject(bytes, format, &img)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| ToolkitError::OperationError(format!("Failed to encode page: {}", e)))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let resources = Dictionary::from_iter(vec![(
        "XObject",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "Im1",
            Object::Reference(image_id),
        )])),
    )]);
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width as i64),
                Object::Integer(height as i64),
            ]),
        ),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(resources)),
    ]));

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    save_document(&mut doc)
}

/// JPEG data is embedded as-is; everything else becomes Flate-compressed RGB
fn image_xobject(
    bytes: &[u8],
    format: ImageFormat,
    img: &DynamicImage,
) -> Result<Stream, ToolkitError> {
    let mut dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(img.width() as i64)),
        ("Height", Object::Integer(img.height() as i64)),
        ("BitsPerComponent", Object::Integer(8)),
    ]);

    let passthrough_space = match (format, img.color()) {
        (ImageFormat::Jpeg, ColorType::Rgb8) => Some(b"DeviceRGB".to_vec()),
        (ImageFormat::Jpeg, ColorType::L8) => Some(b"DeviceGray".to_vec()),
        _ => None,
    };

    if let Some(color_space) = passthrough_space {
        dict.set("ColorSpace", Object::Name(color_space));
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        return Ok(Stream::new(dict, bytes.to_vec()));
    }

    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    let mut stream = Stream::new(dict, img.to_rgb8().into_raw());
    compress_stream(&mut stream)?;
    Ok(stream)
}

/// First decodable image XObject, in page order, re-encoded as PNG
pub fn pdf_to_png(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let doc = Document::load_mem(bytes).map_err(|e| ToolkitError::ParseError(e.to_string()))?;

    for (page_number, page_id) in doc.get_pages() {
        for (name, stream) in page_images(&doc, page_id) {
            match decode_image(stream) {
                Ok(Some(img)) => {
                    debug!(page = page_number, image = %name, "Extracting embedded image");
                    return encode_png(&img);
                }
                Ok(None) => {
                    debug!(page = page_number, image = %name, "Skipping unsupported image encoding")
                }
                Err(e) => {
                    debug!(page = page_number, image = %name, error = %e, "Image failed to decode")
                }
            }
        }
    }

    Err(ToolkitError::NoImages)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ToolkitError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ToolkitError::ConversionError(format!("Failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resources of a page, inherited from the page tree when not set on the page
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(node).ok()?.as_dict().ok()?;
        if let Ok(resources) = dict.get(b"Resources") {
            return resolve(doc, resources)?.as_dict().ok();
        }
        node = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Image XObjects used by a page, with their resource names
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<(String, &Stream)> {
    let xobjects = page_resources(doc, page_id)
        .and_then(|resources| resources.get(b"XObject").ok())
        .and_then(|xobjects| resolve(doc, xobjects))
        .and_then(|xobjects| xobjects.as_dict().ok());

    let Some(xobjects) = xobjects else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(name, obj)| {
            let stream = resolve(doc, obj)?.as_stream().ok()?;
            let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
            (subtype == b"Image").then(|| (String::from_utf8_lossy(name).into_owned(), stream))
        })
        .collect()
}

fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode JPEG and 8-bit Gray/RGB raw or Flate images; `None` for anything else
fn decode_image(stream: &Stream) -> Result<Option<DynamicImage>, ToolkitError> {
    let filters = filters(stream);

    if filters == [b"DCTDecode".to_vec()] {
        let img = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|e| ToolkitError::ConversionError(format!("Bad JPEG data: {}", e)))?;
        return Ok(Some(img));
    }

    if !filters.iter().all(|f| f.as_slice() == b"FlateDecode") {
        return Ok(None);
    }

    let int = |key: &[u8]| stream.dict.get(key).and_then(Object::as_i64).ok();
    let (Some(width), Some(height)) = (int(b"Width"), int(b"Height")) else {
        return Ok(None);
    };
    if int(b"BitsPerComponent") != Some(8) {
        return Ok(None);
    }
    let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => (width, height),
        _ => return Ok(None),
    };

    let channels = match stream.dict.get(b"ColorSpace").and_then(Object::as_name) {
        Ok(b"DeviceRGB") => 3,
        Ok(b"DeviceGray") => 1,
        _ => return Ok(None),
    };

    let mut data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| ToolkitError::ConversionError(format!("Bad image stream: {}", e)))?
    };

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels));
    let expected = match expected {
        Some(expected) if data.len() >= expected => expected,
        _ => return Ok(None),
    };
    data.truncate(expected);

    let img = if channels == 3 {
        RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
    };
    Ok(img)
}
