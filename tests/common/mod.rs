//! PDF fixtures built in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One row of text: (text, font size, bold, top y in top-down coordinates).
pub type Row<'a> = (&'a str, f32, bool, f32);

pub const PAGE_HEIGHT: f32 = 792.0;

fn text_ops(rows: &[Row]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for &(text, size, bold, top) in rows {
        let font = if bold { "F2" } else { "F1" };
        let baseline = PAGE_HEIGHT - top - 0.8 * size;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        ops.push(Operation::new("Td", vec![72.into(), baseline.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Build a PDF with one page per entry; `None` gives a page with broken contents.
pub fn build_pdf(pages: &[Option<Vec<Row>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for rows in pages {
        let contents: Object = match rows {
            Some(rows) => {
                let content = Content {
                    operations: text_ops(rows),
                };
                let stream = Stream::new(dictionary! {}, content.encode().unwrap());
                doc.add_object(stream).into()
            }
            None => Object::Integer(42),
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
