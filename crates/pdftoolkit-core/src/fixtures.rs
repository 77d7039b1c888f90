//! Test fixtures shared by the handler test modules

use lopdf::{Dictionary, Document, Object, Stream};

/// Create a simple PDF with N pages, each drawing the marker `{prefix}-Page-{n}`
pub fn create_test_pdf(num_pages: u32, content_prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let catalog_id = doc.new_object_id();

    let mut page_ids = Vec::new();

    for page_num in 0..num_pages {
        let content = format!(
            "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
            content_prefix,
            page_num + 1
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );

        let page_id = doc.add_object(Object::Dictionary(page_dict));
        page_ids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(num_pages as i64));
    pages_dict.set("Kids", Object::Array(page_ids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog_dict = Dictionary::new();
    catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog_dict.set("Pages", Object::Reference(pages_id));
    doc.objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Two pages under an intermediate `/Pages` node that carries `/Rotate 90`;
/// `/MediaBox` and `/Resources` sit on the root node
pub fn create_inherited_pdf(content_prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let root_id = doc.new_object_id();
    let branch_id = doc.new_object_id();
    let catalog_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut kids = Vec::new();
    for page_num in 1..=2 {
        let content = format!(
            "BT /F1 12 Tf 50 300 Td ({}-Page-{}) Tj ET",
            content_prefix, page_num
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(branch_id));
        page_dict.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page_dict))));
    }

    let mut branch = Dictionary::new();
    branch.set("Type", Object::Name(b"Pages".to_vec()));
    branch.set("Parent", Object::Reference(root_id));
    branch.set("Count", Object::Integer(2));
    branch.set("Kids", Object::Array(kids));
    branch.set("Rotate", Object::Integer(90));
    doc.objects.insert(branch_id, Object::Dictionary(branch));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Pages".to_vec()));
    root.set("Count", Object::Integer(2));
    root.set("Kids", Object::Array(vec![Object::Reference(branch_id)]));
    root.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(300),
            Object::Integer(400),
        ]),
    );
    root.set("Resources", Object::Dictionary(resources));
    doc.objects.insert(root_id, Object::Dictionary(root));

    let mut catalog_dict = Dictionary::new();
    catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog_dict.set("Pages", Object::Reference(root_id));
    doc.objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A page's own `/MediaBox` as integers
pub fn media_box(page: &Dictionary) -> Vec<i64> {
    page.get(b"MediaBox")
        .and_then(Object::as_array)
        .unwrap()
        .iter()
        .map(|value| value.as_i64().unwrap())
        .collect()
}

/// The marker drawn on each page, in page order
pub fn page_markers(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let content = String::from_utf8_lossy(&content);
            let start = content.find('(').unwrap() + 1;
            let end = content[start..].find(')').unwrap() + start;
            content[start..end].to_string()
        })
        .collect()
}

pub fn page_count(pdf: &[u8]) -> usize {
    Document::load_mem(pdf).unwrap().get_pages().len()
}
