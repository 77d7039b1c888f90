//! Page tree helpers shared by merge and split
//!
//! Both operations move pages out from under their original `/Pages` nodes,
//! so attributes a page inherits from those nodes have to travel with it.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `/Parent` chains
const MAX_TREE_DEPTH: usize = 32;

/// Inheritable attributes the page lacks, resolved from its nearest ancestor
pub(crate) fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Vec<(&'static [u8], Object)> {
    let page = match doc.get_dictionary(page_id) {
        Ok(page) => page,
        Err(_) => return Vec::new(),
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = parent_of(page);
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let node = match doc.get_dictionary(node_id) {
            Ok(node) => node,
            Err(_) => break,
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = parent_of(node);
        depth += 1;
    }

    found
}

/// Copy inherited attributes onto the page itself
pub(crate) fn flatten_inherited(doc: &mut Document, page_id: ObjectId) {
    let inherited = inherited_attributes(doc, page_id);
    if inherited.is_empty() {
        return;
    }
    if let Some(Object::Dictionary(page)) = doc.objects.get_mut(&page_id) {
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
}

/// Whether the object is a `/Page` or `/Pages` node
pub(crate) fn is_page_tree_node(object: &Object) -> bool {
    let kind = object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name);
    matches!(kind, Ok(b"Page") | Ok(b"Pages"))
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{create_inherited_pdf, create_test_pdf, media_box};
    use pretty_assertions::assert_eq;

    fn first_page(doc: &Document) -> ObjectId {
        *doc.get_pages().values().next().unwrap()
    }

    #[test]
    fn test_inherits_from_every_ancestor() {
        let doc = Document::load_mem(&create_inherited_pdf("N")).unwrap();
        let page_id = first_page(&doc);

        let keys: Vec<&[u8]> = inherited_attributes(&doc, page_id)
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        assert!(keys.contains(&b"MediaBox".as_slice()));
        assert!(keys.contains(&b"Resources".as_slice()));
        assert!(keys.contains(&b"Rotate".as_slice()));
        assert!(!keys.contains(&b"CropBox".as_slice()));
    }

    #[test]
    fn test_own_attributes_win() {
        let doc = Document::load_mem(&create_test_pdf(1, "A")).unwrap();
        let keys: Vec<&[u8]> = inherited_attributes(&doc, first_page(&doc))
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert!(!keys.contains(&b"MediaBox".as_slice()));
    }

    #[test]
    fn test_flatten_copies_onto_page() {
        let mut doc = Document::load_mem(&create_inherited_pdf("N")).unwrap();
        let page_id = first_page(&doc);

        flatten_inherited(&mut doc, page_id);

        let page = doc.get_dictionary(page_id).unwrap();
        assert_eq!(media_box(page), vec![0, 0, 300, 400]);
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
    }

    #[test]
    fn test_page_tree_node_detection() {
        let doc = Document::load_mem(&create_inherited_pdf("N")).unwrap();
        let page_id = first_page(&doc);
        assert!(is_page_tree_node(doc.get_object(page_id).unwrap()));
        assert!(!is_page_tree_node(&Object::Integer(3)));
    }
}
