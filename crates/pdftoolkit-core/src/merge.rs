//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::error::ToolkitError;
use crate::page_tree::flatten_inherited;
use crate::save_document;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Merge multiple PDFs into one, pages in input order
///
/// The algorithm:
/// 1. If empty, report missing input
/// 2. If single document, return it as-is
/// 3. Take the first document as the destination
/// 4. For each remaining source document:
///    a. Calculate ID offset to avoid conflicts
///    b. Import all objects with remapped IDs
///    c. Append pages to the destination
/// 5. Compress and return the merged result
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, ToolkitError> {
    let mut documents = documents.into_iter();

    let first = match documents.next() {
        Some(first) => first,
        None => return Err(ToolkitError::NoInput),
    };

    let rest: Vec<Vec<u8>> = documents.collect();
    if rest.is_empty() {
        Document::load_mem(&first)
            .map_err(|e| ToolkitError::ParseError(format!("Failed to load document 0: {}", e)))?;
        return Ok(first);
    }

    let mut dest = Document::load_mem(&first)
        .map_err(|e| ToolkitError::ParseError(format!("Failed to load document 0: {}", e)))?;
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = get_page_references(&dest);

    for (i, doc_bytes) in rest.iter().enumerate() {
        let source = Document::load_mem(doc_bytes).map_err(|e| {
            ToolkitError::ParseError(format!("Failed to load document {}: {}", i + 1, e))
        })?;

        // Source pages in page order, before the objects are moved out
        let source_pages = get_page_references(&source);

        let id_offset = dest_max_id;

        let mut remapped_objects = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped_objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.objects.extend(remapped_objects);

        for old_page_ref in source_pages {
            dest_page_refs.push((old_page_ref.0 + id_offset, old_page_ref.1));
        }

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    update_page_tree(&mut dest, &dest_page_refs)?;
    dest.max_id = dest_max_id;

    // Imported catalogs and page trees are unreachable now
    dest.prune_objects();
    dest.compress();

    save_document(&mut dest)
}

/// Page object references of a document, in page order
fn get_page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root page tree at every collected page
fn update_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), ToolkitError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ToolkitError::OperationError("No Root reference in trailer".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| ToolkitError::OperationError("Catalog not found".into()))?
        .as_dict()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| ToolkitError::OperationError("Invalid Pages in catalog".into()))?;

    let kids = page_refs
        .iter()
        .map(|&id| Object::Reference(id))
        .collect::<Vec<_>>();

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            pages_dict.set("Kids", Object::Array(kids));
            pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        }
        _ => {
            return Err(ToolkitError::OperationError(
                "Invalid pages dictionary".into(),
            ))
        }
    }

    // Pages still point at their old parent nodes, which are about to be dropped
    for page_id in page_refs {
        flatten_inherited(doc, *page_id);
        if let Some(Object::Dictionary(page)) = doc.objects.get_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}
