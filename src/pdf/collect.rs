//! Page collection: build a new document out of pages from other documents.
//!
//! Source documents are imported wholesale with their object ids shifted past
//! everything already in the output, then individual pages are appended in
//! whatever order the caller wants. Objects that no appended page reaches
//! are pruned when the collector is finished.

use anyhow::{anyhow, Context, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

use crate::pdf::PdfDocument;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub struct PageCollector {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    used: HashSet<ObjectId>,
}

/// Pages of an imported document, addressed by zero-based index.
#[derive(Debug, Clone)]
pub struct SourcePages {
    name: String,
    pages: Vec<ObjectId>,
}

impl SourcePages {
    pub fn page(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or_else(|| {
            anyhow!(
                "Page {} is out of range (1-{}) in {}",
                index + 1,
                self.pages.len(),
                self.name
            )
        })
    }

    pub fn all(&self) -> &[ObjectId] {
        &self.pages
    }
}

impl PageCollector {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        PageCollector {
            doc,
            pages_id,
            kids: Vec::new(),
            used: HashSet::new(),
        }
    }

    /// Output document under construction, for adding fonts, images and streams.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Copy every object of `source` into the output and return its pages.
    ///
    /// Nothing is appended yet; pick pages from the returned [`SourcePages`].
    pub fn import(&mut self, source: &PdfDocument) -> Result<SourcePages> {
        let offset = self.doc.max_id;
        let src = &source.doc;
        let page_ids = source.page_ids();

        // resolve inheritance while the source page tree is still intact
        let inherited: Vec<Vec<(&[u8], Object)>> = page_ids
            .iter()
            .map(|&id| inherited_attributes(src, id))
            .collect();

        for (&id, object) in &src.objects {
            let mut object = object.clone();
            shift_refs(&mut object, offset);
            self.doc.objects.insert(shift_id(id, offset), object);
        }
        self.doc.max_id = offset + src.max_id;

        let mut pages = Vec::with_capacity(page_ids.len());
        for (id, attrs) in page_ids.into_iter().zip(inherited) {
            let new_id = shift_id(id, offset);
            let page = self
                .doc
                .get_object_mut(new_id)
                .and_then(|o| o.as_dict_mut())
                .with_context(|| format!("Page object {:?} in {} is not a dictionary", id, source.name))?;
            for (key, mut value) in attrs {
                shift_refs(&mut value, offset);
                page.set(key, value);
            }
            pages.push(new_id);
        }

        debug!(source = %source.name, pages = pages.len(), offset, "imported document");
        Ok(SourcePages {
            name: source.name.clone(),
            pages,
        })
    }

    /// Append an imported page to the output.
    ///
    /// A page appended more than once is cloned so every leaf in the page
    /// tree is a distinct object.
    pub fn append(&mut self, page_id: ObjectId) -> Result<()> {
        let id = if self.used.contains(&page_id) {
            let copy = self
                .doc
                .get_dictionary(page_id)
                .with_context(|| format!("Missing page object {:?}", page_id))?
                .clone();
            self.doc.add_object(copy)
        } else {
            page_id
        };
        self.used.insert(id);
        self.kids.push(id);
        Ok(())
    }

    /// Append every page of an imported document, in order.
    pub fn append_all(&mut self, source: &SourcePages) -> Result<()> {
        for &page_id in source.all() {
            self.append(page_id)?;
        }
        Ok(())
    }

    /// Append a freshly built page dictionary.
    pub fn add_page(&mut self, page: Dictionary) -> ObjectId {
        let id = self.doc.add_object(page);
        self.used.insert(id);
        self.kids.push(id);
        id
    }

    pub fn finish(mut self) -> Result<Document> {
        if self.kids.is_empty() {
            anyhow::bail!("No pages to write");
        }

        for &kid in &self.kids {
            let page = self
                .doc
                .get_object_mut(kid)
                .and_then(|o| o.as_dict_mut())
                .with_context(|| format!("Page object {:?} is not a dictionary", kid))?;
            page.set("Type", "Page");
            page.set("Parent", Object::Reference(self.pages_id));
        }

        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let pruned = self.doc.prune_objects();
        self.doc.renumber_objects();
        debug!(pages = count, pruned = pruned.len(), "finished document");
        Ok(self.doc)
    }
}

impl Default for PageCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn shift_id(id: ObjectId, offset: u32) -> ObjectId {
    (id.0 + offset, id.1)
}

fn shift_refs(object: &mut Object, offset: u32) {
    match object {
        Object::Reference(id) => id.0 += offset,
        Object::Array(items) => items.iter_mut().for_each(|o| shift_refs(o, offset)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, v)| shift_refs(v, offset)),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .for_each(|(_, v)| shift_refs(v, offset)),
        _ => {}
    }
}

/// Attributes the page does not set itself but inherits from an ancestor.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found: Vec<(&'static [u8], Object)> = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut parent = page.get(b"Parent").and_then(|o| o.as_reference()).ok();
    let mut visited = HashSet::new();
    while let Some(parent_id) = parent {
        // malformed files can contain cycles in the page tree
        if !visited.insert(parent_id) {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if page.has(key) || found.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
            }
        }
        parent = node.get(b"Parent").and_then(|o| o.as_reference()).ok();
    }
    found
}
