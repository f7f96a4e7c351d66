//! Page factories and page stamping.

use anyhow::{Context, Result};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::pdf::collect::PageCollector;

/// A4 in points.
pub const A4: (i64, i64) = (595, 842);

/// Default page size when a page has no usable MediaBox (US Letter).
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

const TEXT_FONT: &str = "FBody";
const NUMBER_FONT: &str = "FPageNo";

const MARGIN: i64 = 28;
const LINE_HEIGHT: i64 = 28;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

fn helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Encode text for a WinAnsi simple font. Characters outside Latin-1 become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x09 => b' ',
            _ => b'?',
        })
        .collect()
}

fn text_width(text: &str, size: i64) -> i64 {
    let units: i64 = win_ansi(text)
        .into_iter()
        .map(|b| match b {
            32..=126 => HELVETICA_WIDTHS[(b - 32) as usize] as i64,
            _ => 556,
        })
        .sum();
    units * size / 1000
}

fn show_text(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn add_content(doc: &mut Document, operations: Vec<Operation>) -> Result<ObjectId> {
    let content = Content { operations };
    let mut stream = Stream::new(Dictionary::new(), content.encode()?);
    stream.compress()?;
    Ok(doc.add_object(stream))
}

fn text_page(
    collector: &mut PageCollector,
    font_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<()> {
    let contents = add_content(collector.doc_mut(), operations)?;
    collector.add_page(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), A4.0.into(), A4.1.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { TEXT_FONT => Object::Reference(font_id) },
        },
        "Contents" => Object::Reference(contents),
    });
    Ok(())
}

/// Append `count` A4 pages, each labelled "Page n" centred near the top.
pub fn blank_pages(collector: &mut PageCollector, count: u32) -> Result<()> {
    let font_id = helvetica(collector.doc_mut());
    let size = 12;
    let baseline = A4.1 - MARGIN - size;

    for n in 1..=count {
        let label = format!("Page {}", n);
        let x = (A4.0 - text_width(&label, size)) / 2;
        text_page(collector, font_id, show_text(TEXT_FONT, size, x, baseline, &label))?;
    }
    debug!(count, "built blank pages");
    Ok(())
}

/// Append A4 pages showing `text`, one line per row, starting new pages as needed.
///
/// Lines are not wrapped. Empty text still produces one page.
pub fn text_pages(collector: &mut PageCollector, text: &str) -> Result<usize> {
    let font_id = helvetica(collector.doc_mut());
    let size = 12;
    let top = A4.1 - MARGIN - size;
    let rows_per_page = ((top - MARGIN) / LINE_HEIGHT + 1) as usize;

    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let mut pages = 0;
    for chunk in lines.chunks(rows_per_page) {
        let operations = chunk
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                show_text(TEXT_FONT, size, MARGIN, top - row as i64 * LINE_HEIGHT, line)
            })
            .collect();
        text_page(collector, font_id, operations)?;
        pages += 1;
    }
    debug!(lines = lines.len(), pages, "built text pages");
    Ok(pages)
}

/// Append one page holding `image`, sized one point per pixel.
pub fn image_page(collector: &mut PageCollector, image: &DynamicImage) -> Result<()> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as i64, rgb.height() as i64);

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    );
    stream.compress()?;
    let doc = collector.doc_mut();
    let image_id = doc.add_object(stream);

    let contents = add_content(
        doc,
        vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    )?;

    collector.add_page(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => Object::Reference(image_id) },
        },
        "Contents" => Object::Reference(contents),
    });
    debug!(width, height, "built image page");
    Ok(())
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn media_box(doc: &Document, page: &Dictionary) -> [f32; 4] {
    let Ok(Object::Array(items)) = page.get(b"MediaBox").map(|o| resolve(doc, o)) else {
        return FALLBACK_MEDIA_BOX;
    };
    let values: Vec<f32> = items.iter().filter_map(|o| number(resolve(doc, o))).collect();
    match values.as_slice() {
        [a, b, c, d] => [a.min(*c), b.min(*d), a.max(*c), b.max(*d)],
        _ => FALLBACK_MEDIA_BOX,
    }
}

/// Resolve an optional dictionary entry that may be inline or referenced.
fn owned_dict(doc: &Document, dict: &Dictionary, key: &[u8]) -> Dictionary {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Stamp "Page n" 50pt from the left and 50pt below the top of every page.
///
/// Pages are expected to carry their own `Resources` and `MediaBox`, as
/// documents produced by [`PageCollector`] do. Returns the number of pages.
pub fn stamp_page_numbers(doc: &mut Document) -> Result<u32> {
    let font_id = helvetica(doc);
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for (index, &page_id) in page_ids.iter().enumerate() {
        let page = doc
            .get_dictionary(page_id)
            .with_context(|| format!("Missing page object {:?}", page_id))?;

        let [llx, _, _, ury] = media_box(doc, page);
        let mut resources = owned_dict(doc, page, b"Resources");
        let mut fonts = owned_dict(doc, &resources, b"Font");
        fonts.set(NUMBER_FONT, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));

        let existing: Vec<Object> = match page.get(b"Contents").map(|o| (o, resolve(doc, o))) {
            Ok((_, Object::Array(items))) => items.clone(),
            Ok((original, _)) if matches!(original, Object::Reference(_)) => vec![original.clone()],
            _ => Vec::new(),
        };

        // isolate the original content's graphics state from the stamp
        let save = add_content(doc, vec![Operation::new("q", vec![])])?;
        let mut stamp = vec![Operation::new("Q", vec![])];
        stamp.extend(show_text(
            NUMBER_FONT,
            10,
            (llx + 50.0) as i64,
            (ury - 50.0) as i64,
            &format!("Page {}", index + 1),
        ));
        let stamp = add_content(doc, stamp)?;

        let mut contents = vec![Object::Reference(save)];
        contents.extend(existing);
        contents.push(Object::Reference(stamp));

        let page = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .with_context(|| format!("Page object {:?} is not a dictionary", page_id))?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(contents));
    }

    debug!(pages = page_ids.len(), "stamped page numbers");
    Ok(page_ids.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{page_labels, page_texts, sample_pdf};
    use crate::pdf::PdfDocument;
    use image::{Rgb, RgbImage};

    fn reload(mut doc: Document) -> PdfDocument {
        let bytes = PdfDocument::to_bytes(&mut doc).unwrap();
        PdfDocument::from_bytes(&bytes, "out").unwrap()
    }

    #[test]
    fn test_win_ansi_replaces_unmappable() {
        assert_eq!(win_ansi("a(b)é€"), b"a(b)\xe9?".to_vec());
    }

    #[test]
    fn test_text_width() {
        // "Page 1" = 667 + 556 + 556 + 556 + 278 + 556
        assert_eq!(text_width("Page 1", 1000), 3169);
    }

    #[test]
    fn test_blank_pages() {
        let mut collector = PageCollector::new();
        blank_pages(&mut collector, 3).unwrap();
        let out = reload(collector.finish().unwrap());
        assert_eq!(page_labels(&out), vec!["Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn test_text_pages_paginate() {
        let text = (1..=40).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\r\n");
        let mut collector = PageCollector::new();
        let pages = text_pages(&mut collector, &text).unwrap();
        assert_eq!(pages, 2);

        let out = reload(collector.finish().unwrap());
        let texts = page_texts(&out);
        assert_eq!(texts[0][0], "line 1");
        assert_eq!(texts[0].len() + texts[1].len(), 40);
        assert_eq!(texts[1].last().map(String::as_str), Some("line 40"));
    }

    #[test]
    fn test_empty_text_makes_one_page() {
        let mut collector = PageCollector::new();
        assert_eq!(text_pages(&mut collector, "").unwrap(), 1);
    }

    #[test]
    fn test_image_page_size_matches_pixels() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([255, 0, 0])));
        let mut collector = PageCollector::new();
        image_page(&mut collector, &image).unwrap();

        let out = reload(collector.finish().unwrap());
        let page = out.doc.get_dictionary(out.page_ids()[0]).unwrap();
        assert_eq!(media_box(&out.doc, page), [0.0, 0.0, 20.0, 10.0]);
    }

    #[test]
    fn test_stamp_page_numbers() {
        let source = PdfDocument::from_bytes(&sample_pdf(2), "sample").unwrap();
        let mut doc = source.doc.clone();
        assert_eq!(stamp_page_numbers(&mut doc).unwrap(), 2);

        let out = reload(doc);
        assert_eq!(
            page_texts(&out),
            vec![
                vec!["Page 1".to_string(), "Page 1".to_string()],
                vec!["Page 2".to_string(), "Page 2".to_string()],
            ]
        );
        let page = out.doc.get_dictionary(out.page_ids()[0]).unwrap();
        let fonts = owned_dict(&out.doc, &owned_dict(&out.doc, page, b"Resources"), b"Font");
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(NUMBER_FONT.as_bytes()));
    }

    #[test]
    fn test_stamp_position_follows_media_box() {
        let source = PdfDocument::from_bytes(&sample_pdf(1), "sample").unwrap();
        let mut doc = source.doc.clone();
        let page_id = source.page_ids()[0];
        doc.get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .unwrap()
            .set("MediaBox", vec![10.into(), 20.into(), 310.into(), 420.into()]);
        stamp_page_numbers(&mut doc).unwrap();

        let out = reload(doc);
        let bytes = out.doc.get_page_content(out.page_ids()[0]).unwrap();
        let operations = Content::decode(&bytes).unwrap().operations;
        let stamp = operations
            .iter()
            .position(|op| {
                op.operator == "Tf"
                    && op.operands[0].as_name().ok() == Some(NUMBER_FONT.as_bytes())
            })
            .unwrap();
        let td = &operations[stamp + 1];
        assert_eq!(td.operator, "Td");
        let position: Vec<i64> = td.operands.iter().map(|o| o.as_i64().unwrap()).collect();
        assert_eq!(position, vec![60, 370]);
    }

    #[test]
    fn test_media_box_fallback() {
        let doc = Document::with_version("1.7");
        assert_eq!(media_box(&doc, &Dictionary::new()), FALLBACK_MEDIA_BOX);
    }
}
