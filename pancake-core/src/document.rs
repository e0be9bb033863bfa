//! The page tree that elements live in.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{DocumentError, DocumentResult, Element, ElementId};

/// A page: an `html` root with a `body`, plus any detached elements.
///
/// Elements are owned by the document and addressed by [`ElementId`].
/// Detached elements (created but never inserted, or removed) stay owned
/// until [`release`](Self::release) drops them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// All elements, attached or not, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// The `html` element.
    root: ElementId,
    /// The `body` element.
    body: ElementId,
}

impl Document {
    /// Create an empty page.
    #[must_use]
    pub fn new() -> Self {
        let mut root = Element::new("html");
        let mut body = Element::new("body");
        body.parent = Some(root.id);
        root.children.push(body.id);

        let (root_id, body_id) = (root.id, body.id);
        let mut elements = HashMap::new();
        elements.insert(root_id, root);
        elements.insert(body_id, body);

        Self {
            elements,
            root: root_id,
            body: body_id,
        }
    }

    /// The `html` root element.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The `body` element.
    #[must_use]
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.add_element(Element::new(tag))
    }

    /// Take ownership of a prebuilt element as a detached node.
    ///
    /// Tree links on the element are cleared.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        element.parent = None;
        element.children.clear();
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    /// Get an element by ID.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Check whether the document owns an element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of owned elements, including detached ones.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Set an attribute on an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> DocumentResult<()> {
        self.get_mut(id)?.attributes.set(name, value);
        Ok(())
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements.get(&id)?.attribute(name)
    }

    /// Parent of an element.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id)?.parent
    }

    /// Children of an element, in order. Empty for unknown IDs.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map_or(&[][..], |e| e.children.as_slice())
    }

    /// The element following `id` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(id)?);
        let idx = siblings.iter().position(|&c| c == id)?;
        siblings.get(idx + 1).copied()
    }

    /// True when the element is reachable from the root.
    #[must_use]
    pub fn is_connected(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == self.root {
                return true;
            }
            current = self.parent(cur);
        }
        false
    }

    /// Find the first connected element, in document order, whose `id`
    /// attribute equals `html_id`.
    #[must_use]
    pub fn get_element_by_id(&self, html_id: &str) -> Option<ElementId> {
        if html_id.is_empty() {
            return None;
        }
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let element = self.elements.get(&id)?;
            if element.attribute("id") == Some(html_id) {
                return Some(id);
            }
            stack.extend(element.children.iter().rev());
        }
        None
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// # Errors
    ///
    /// Returns an error if either element is missing or the move would
    /// create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> DocumentResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or last when
    /// `reference` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is missing, `parent` is a text node,
    /// `reference` is not a child of `parent`, or the move would create a
    /// cycle.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> DocumentResult<()> {
        if self.get(parent)?.is_text() {
            return Err(DocumentError::InvalidOperation(format!(
                "text node {parent} cannot have children"
            )));
        }
        self.get(child)?;
        if child == self.root || self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::InvalidOperation(format!(
                "cannot insert {child} under its own descendant {parent}"
            )));
        }
        if reference == Some(child) {
            return Ok(());
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DocumentError::InvalidOperation(format!(
                    "{reference} is not a child of {parent}"
                )));
            }
        }

        self.detach(child);

        let siblings = &mut self.get_mut(parent)?.children;
        let idx = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(idx, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove `child` from `parent`. The child stays owned and detached.
    ///
    /// # Errors
    ///
    /// Returns an error if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> DocumentResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(DocumentError::InvalidOperation(format!(
                "{child} is not a child of {parent}"
            )));
        }
        self.detach(child);
        Ok(())
    }

    /// Copy an element (and its subtree when `deep`) into a new detached node.
    ///
    /// Canvas pixel surfaces are copied with the element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn clone_node(&mut self, id: ElementId, deep: bool) -> DocumentResult<ElementId> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        let children = if deep {
            source.children.clone()
        } else {
            Vec::new()
        };

        copy.id = ElementId::new();
        copy.parent = None;
        copy.children.clear();
        let copy_id = copy.id;
        self.elements.insert(copy_id, copy);

        for child in children {
            let child_copy = self.clone_node(child, true)?;
            self.append_child(copy_id, child_copy)?;
        }
        Ok(copy_id)
    }

    /// Drop a detached element and its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or still has a parent.
    pub fn release(&mut self, id: ElementId) -> DocumentResult<()> {
        let element = self.get(id)?;
        if element.parent.is_some() || id == self.root {
            return Err(DocumentError::InvalidOperation(format!(
                "cannot release attached element {id}"
            )));
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(removed) = self.elements.remove(&cur) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Serialize an element and its subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn outer_markup(&self, id: ElementId) -> DocumentResult<String> {
        let mut out = String::new();
        self.write_markup(&mut out, id)?;
        Ok(out)
    }

    /// Serialize an element's child nodes, without its own tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn inner_markup(&self, id: ElementId) -> DocumentResult<String> {
        let element = self.get(id)?;
        let mut out = String::new();
        for &child in &element.children {
            self.write_markup(&mut out, child)?;
        }
        Ok(out)
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DocumentResult<String> {
        serde_json::to_string(self).map_err(DocumentError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the tree links are
    /// inconsistent (missing root or body, dangling or duplicate children,
    /// parent/child mismatch, or a cycle).
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let doc: Self = serde_json::from_str(json).map_err(DocumentError::Serialization)?;
        doc.check_links()?;
        Ok(doc)
    }

    fn write_markup(&self, out: &mut String, id: ElementId) -> DocumentResult<()> {
        let element = self.get(id)?;
        if element.is_text() {
            out.push_str(&escape_xml(element.text.as_deref().unwrap_or_default()));
            return Ok(());
        }
        let _ = write!(out, "<{}", element.tag);
        for (name, value) in element.attributes.iter() {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }
        out.push('>');
        for &child in &element.children {
            self.write_markup(out, child)?;
        }
        let _ = write!(out, "</{}>", element.tag);
        Ok(())
    }

    fn check_links(&self) -> DocumentResult<()> {
        let broken = |msg: String| Err(DocumentError::InconsistentTree(msg));

        if self.get(self.root)?.parent.is_some() {
            return broken(format!("root {} has a parent", self.root));
        }
        if self.parent(self.body) != Some(self.root) {
            return broken(format!("body {} is not a child of the root", self.body));
        }

        for (&id, element) in &self.elements {
            if element.id != id {
                return broken(format!("element {} stored under {id}", element.id));
            }
            let mut seen = HashSet::new();
            for &child in &element.children {
                if !seen.insert(child) || self.parent(child) != Some(id) {
                    return broken(format!("child {child} of {id} is missing or misplaced"));
                }
            }
            if let Some(parent) = element.parent {
                if !self.children(parent).contains(&id) {
                    return broken(format!("{id} is not listed by its parent {parent}"));
                }
            }

            let mut ancestor = element.parent;
            let mut depth = 0;
            while let Some(cur) = ancestor {
                depth += 1;
                if depth > self.elements.len() {
                    return broken(format!("{id} is inside a cycle"));
                }
                ancestor = self.parent(cur);
            }
        }
        Ok(())
    }

    fn detach(&mut self, child: ElementId) {
        if let Some(old_parent) = self.elements.get_mut(&child).and_then(|e| e.parent.take()) {
            if let Some(parent) = self.elements.get_mut(&old_parent) {
                parent.children.retain(|&c| c != child);
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.parent(cur);
        }
        false
    }

    fn get(&self, id: ElementId) -> DocumentResult<&Element> {
        self.elements
            .get(&id)
            .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: ElementId) -> DocumentResult<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
