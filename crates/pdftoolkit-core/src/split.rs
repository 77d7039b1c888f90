//! PDF Split algorithm
//!
//! Decomposes a document into one file per page using "Construction by
//! Whitelist": each output holds only what its page reaches.

use crate::error::ToolkitError;
use crate::page_tree::{inherited_attributes, is_page_tree_node};
use crate::save_document;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the single-page output for a zero-based page index
pub fn page_file_name(index: usize) -> String {
    format!("{}_output.pdf", index)
}

/// Split a PDF into single-page PDFs; element `i` holds page `i` (zero-based)
pub fn split_pages(bytes: &[u8]) -> Result<Vec<Vec<u8>>, ToolkitError> {
    let doc = Document::load_mem(bytes).map_err(|e| ToolkitError::ParseError(e.to_string()))?;

    doc.get_pages()
        .values()
        .map(|&page_id| extract_page(&doc, page_id))
        .collect()
}

/// Write every page of a PDF to `dir` as `{index}_output.pdf`
///
/// Returns the written paths in page order. `dir` should be private to the
/// caller; file names repeat across documents.
pub fn split_to_dir(bytes: &[u8], dir: &Path) -> Result<Vec<PathBuf>, ToolkitError> {
    let pages = split_pages(bytes)?;
    let mut paths = Vec::with_capacity(pages.len());

    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(page_file_name(index));
        fs::write(&path, page)?;
        paths.push(path);
    }

    Ok(paths)
}

/// "Construction by Whitelist":
/// 1. Copy the page with the attributes it inherits
/// 2. Copy every object reachable from it, without entering the page tree
/// 3. Hang the page under a fresh catalog and serialize
///
/// Object ids are kept, so the source document is never cloned.
fn extract_page(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>, ToolkitError> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| ToolkitError::OperationError(format!("Unreadable page: {}", e)))?
        .clone();
    for (key, value) in inherited_attributes(doc, page_id) {
        page.set(key, value);
    }

    let mut new_doc = Document::with_version(doc.version.clone());
    new_doc.max_id = doc.max_id;

    let mut pending = Vec::new();
    collect_references(&Object::Dictionary(page.clone()), &mut pending);
    let mut visited = HashSet::from([page_id]);

    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        // Dangling references are left as they are
        let object = match doc.get_object(id) {
            Ok(object) => object,
            Err(_) => continue,
        };
        // Links to other pages stay dangling instead of pulling their content in
        if is_page_tree_node(object) {
            continue;
        }
        collect_references(object, &mut pending);
        new_doc.objects.insert(id, object.clone());
    }

    let pages_id = new_doc.new_object_id();
    let catalog_id = new_doc.new_object_id();

    page.set("Parent", Object::Reference(pages_id));
    new_doc.objects.insert(page_id, Object::Dictionary(page));

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages_dict.set("Count", Object::Integer(1));
    new_doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    new_doc.objects.insert(catalog_id, Object::Dictionary(catalog));

    new_doc.trailer.set("Root", Object::Reference(catalog_id));
    new_doc.compress();

    save_document(&mut new_doc)
}

/// Push every reference held by `object`, skipping `/Parent` links
fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Object::Dictionary(dict) => collect_dict_references(dict, out),
        Object::Stream(stream) => collect_dict_references(&stream.dict, out),
        _ => {}
    }
}

fn collect_dict_references(dict: &Dictionary, out: &mut Vec<ObjectId>) {
    for (key, value) in dict.iter() {
        if key.as_slice() != b"Parent" {
            collect_references(value, out);
        }
    }
}
