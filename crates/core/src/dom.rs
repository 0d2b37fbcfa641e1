use std::fmt;

use indextree::{Arena, NodeId};

/// 節點種類。 / Kind of node stored in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text { text: String },
    /// Markup inserted verbatim (thumbnails, custom renderer output).
    Markup { html: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: Vec<(String, String)>,
}

impl DomNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
        }
    }
}

/// 以 arena 儲存的簡易元素樹。 / Minimal element tree backed by an `indextree` arena.
///
/// Every list view owns one of these; detached renders therefore never share
/// nodes with the primary tree.
#[derive(Clone)]
pub struct Dom {
    arena: Arena<DomNode>,
    root: NodeId,
}

impl Dom {
    /// 以指定標籤建立根元素。 / Creates a tree whose root element has the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::new(NodeKind::Element { tag: tag.into() }));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.arena
            .new_node(DomNode::new(NodeKind::Element { tag: tag.into() }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .new_node(DomNode::new(NodeKind::Text { text: text.into() }))
    }

    pub fn create_markup(&mut self, html: impl Into<String>) -> NodeId {
        self.arena
            .new_node(DomNode::new(NodeKind::Markup { html: html.into() }))
    }

    /// 建立元素並附加到父節點，同時設定 class。 / Creates an element with `class`, appended to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, class: &str) -> NodeId {
        let node = self.create_element(tag);
        if !class.is_empty() {
            self.set_attr(node, "class", class);
        }
        self.append(parent, node);
        node
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// 移除節點及其子樹。 / Detaches and frees the node with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        if self.is_alive(node) {
            node.remove_subtree(&mut self.arena);
        }
    }

    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            child.remove_subtree(&mut self.arena);
        }
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.arena
            .get(node)
            .map_or(false, |entry| !entry.is_removed())
    }

    pub fn node(&self, node: NodeId) -> Option<&DomNode> {
        self.arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .map(|entry| entry.get())
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut DomNode> {
        self.arena
            .get_mut(node)
            .filter(|entry| !entry.is_removed())
            .map(|entry| entry.get_mut())
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.is_alive(node) {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 設定屬性；已存在時覆寫並保留原順序。 / Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let Some(data) = self.node_mut(node) else {
            return;
        };
        let value = value.into();
        match data.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => data.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(data) = self.node_mut(node) {
            data.attrs.retain(|(key, _)| key != name);
        }
    }

    pub fn clear_attrs(&mut self, node: NodeId) {
        if let Some(data) = self.node_mut(node) {
            data.attrs.clear();
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let next = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", next);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attr(node, "class") else {
            return;
        };
        let next = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "class", next);
    }

    /// 與 DOM `closest` 相同：自身或最近的祖先。 / Like DOM `closest`: the node itself or its nearest ancestor with `class`.
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        if !self.is_alive(node) {
            return None;
        }
        node.ancestors(&self.arena)
            .find(|candidate| self.has_class(*candidate, class))
    }

    /// 依前序列出具備指定 class 的節點（含自身）。 / Nodes carrying `class` in document order, `scope` included.
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        if !self.is_alive(scope) {
            return Vec::new();
        }
        scope
            .descendants(&self.arena)
            .filter(|candidate| self.has_class(*candidate, class))
            .collect()
    }

    pub fn first_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.find_by_class(scope, class).into_iter().next()
    }

    pub fn find_by_attr(&self, scope: NodeId, name: &str, value: &str) -> Option<NodeId> {
        if !self.is_alive(scope) {
            return None;
        }
        scope
            .descendants(&self.arena)
            .find(|candidate| self.attr(*candidate, name) == Some(value))
    }

    /// 串接子樹中的文字節點。 / Concatenated text of the subtree; raw markup is skipped.
    pub fn text_content(&self, node: NodeId) -> String {
        if !self.is_alive(node) {
            return String::new();
        }
        node.descendants(&self.arena)
            .filter_map(|id| match &self.node(id)?.kind {
                NodeKind::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// 將另一棵樹的子樹複製到此樹。 / Deep-copies `source` from `other` and appends it under `parent`.
    pub fn append_copy(&mut self, parent: NodeId, other: &Dom, source: NodeId) -> Option<NodeId> {
        let data = other.node(source)?.clone();
        let copy = self.arena.new_node(data);
        self.append(parent, copy);
        for child in other.children(source) {
            self.append_copy(copy, other, child);
        }
        Some(copy)
    }

    pub fn html(&self) -> String {
        self.to_html(self.root)
    }

    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// 僅輸出子節點的 HTML。 / HTML of the node's children, without the node itself.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.node(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text { text } => out.push_str(&escape_text(text)),
            NodeKind::Markup { html } => out.push_str(html),
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &data.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                for child in node.children(&self.arena) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom").field("html", &self.html()).finish()
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements_with_escaping() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let label = dom.append_element(root, "span", "label");
        dom.set_attr(label, "title", "a \"quoted\" <title>");
        let text = dom.create_text("Tom & Jerry");
        dom.append(label, text);
        let raw = dom.create_markup("<img src=\"x.png\">");
        dom.append(root, raw);

        assert_eq!(
            dom.html(),
            "<div><span class=\"label\" title=\"a &quot;quoted&quot; &lt;title>\">Tom &amp; Jerry</span><img src=\"x.png\"></div>"
        );
    }

    #[test]
    fn closest_walks_up_to_matching_ancestor() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let item = dom.append_element(root, "div", "item selected");
        let icon = dom.append_element(item, "span", "icon");

        assert_eq!(dom.closest(icon, "item"), Some(item));
        assert_eq!(dom.closest(icon, "icon"), Some(icon));
        assert_eq!(dom.closest(icon, "missing"), None);
    }

    #[test]
    fn class_helpers_keep_list_normalised() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        dom.add_class(root, "a");
        dom.add_class(root, "b");
        dom.add_class(root, "a");
        assert_eq!(dom.attr(root, "class"), Some("a b"));
        dom.remove_class(root, "a");
        assert_eq!(dom.attr(root, "class"), Some("b"));
        assert!(dom.has_class(root, "b"));
    }

    #[test]
    fn removed_nodes_disappear_from_queries() {
        let mut dom = Dom::new("ul");
        let root = dom.root();
        let first = dom.append_element(root, "li", "row");
        dom.append_element(root, "li", "row");
        assert_eq!(dom.find_by_class(root, "row").len(), 2);

        dom.remove(first);
        assert!(!dom.is_alive(first));
        assert_eq!(dom.find_by_class(root, "row").len(), 1);
        assert_eq!(dom.closest(first, "row"), None);

        dom.clear_children(root);
        assert!(dom.children(root).is_empty());
    }

    #[test]
    fn append_copy_duplicates_subtree() {
        let mut source = Dom::new("section");
        let root = source.root();
        let child = source.append_element(root, "p", "copy-me");
        let text = source.create_text("hello");
        source.append(child, text);

        let mut target = Dom::new("div");
        let target_root = target.root();
        target.append_copy(target_root, &source, root);
        assert_eq!(
            target.html(),
            "<div><section><p class=\"copy-me\">hello</p></section></div>"
        );
        assert_eq!(target.text_content(target_root), "hello");
    }
}
