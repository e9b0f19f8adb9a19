use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    /// Attribute names in source order, for stable serialization.
    pub(crate) attr_order: Vec<String>,
}

impl Element {
    pub(crate) fn new(tag_name: String, attrs: Vec<(String, String)>) -> Self {
        let mut element = Self {
            tag_name,
            attrs: HashMap::new(),
            attr_order: Vec::new(),
        };
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        element
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub(crate) fn set_attr(&mut self, name: String, value: String) {
        if !self.attrs.contains_key(&name) {
            self.attr_order.push(name.clone());
        }
        self.attrs.insert(name, value);
    }

    pub(crate) fn inline_style(&self, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        parse_style_declarations(self.attr("style"))
            .into_iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value)
    }

    /// Sets one inline declaration; an existing one keeps its position.
    pub(crate) fn set_inline_style(&mut self, property: &str, value: &str) {
        let mut decls = parse_style_declarations(self.attr("style"));
        let property = property.to_ascii_lowercase();
        if let Some(pos) = decls.iter().position(|(name, _)| *name == property) {
            decls[pos].1 = value.to_string();
        } else {
            decls.push((property, value.to_string()));
        }
        self.set_attr("style".to_string(), serialize_style_declarations(&decls));
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, Vec<NodeId>>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id_attr = element.attr("id").map(ToOwned::to_owned);
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = id_attr {
            self.index_id(id_attr, id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    fn index_id(&mut self, id_attr: String, node_id: NodeId) {
        if id_attr.is_empty() {
            return;
        }
        let entries = self.id_index.entry(id_attr).or_default();
        entries.push(node_id);
        entries.sort();
    }

    fn unindex_id(&mut self, id_attr: &str, node_id: NodeId) {
        if let Some(entries) = self.id_index.get_mut(id_attr) {
            entries.retain(|existing| *existing != node_id);
            if entries.is_empty() {
                self.id_index.remove(id_attr);
            }
        }
    }

    pub(crate) fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.0)
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.node(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id).and_then(|node| node.parent)
    }

    /// The node followed by its ancestors, innermost first.
    pub(crate) fn ancestors_inclusive(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// Copies `node_id` and its descendants from `source` under `parent`.
    pub(crate) fn import_subtree(&mut self, source: &Dom, node_id: NodeId, parent: NodeId) {
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            let Some(node) = source.node(node_id) else {
                return;
            };
            let copy = match &node.node_type {
                NodeType::Document => parent,
                NodeType::Element(element) => self.create_element(parent, element.clone()),
                NodeType::Text(text) => self.create_text(parent, text.clone()),
            };
            for child in &node.children {
                self.import_subtree(source, *child, copy);
            }
        })
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index
            .get(id)
            .and_then(|entries| entries.first().copied())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attr(name))
            .map(ToOwned::to_owned)
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let old_id = if name == "id" {
            self.attr(node_id, "id")
        } else {
            None
        };
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("set_attr target is not an element".into()))?;
        element.set_attr(name.to_string(), value.to_string());

        if name == "id" {
            if let Some(old_id) = old_id {
                self.unindex_id(&old_id, node_id);
            }
            self.index_id(value.to_string(), node_id);
        }
        Ok(())
    }

    /// All elements in document order.
    pub(crate) fn all_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node_id) = stack.pop() {
            if self.element(node_id).is_some() {
                out.push(node_id);
            }
            if let Some(node) = self.node(node_id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn elements_by_class_name(&self, class_name: &str) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|node_id| {
                self.element(*node_id)
                    .is_some_and(|element| has_class(element, class_name))
            })
            .collect()
    }

    pub(crate) fn inline_style(&self, node_id: NodeId, property: &str) -> Option<String> {
        self.element(node_id)?.inline_style(property)
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node_id, &mut out);
        out
    }

    fn collect_text(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            let Some(node) = self.node(node_id) else {
                return;
            };
            match &node.node_type {
                NodeType::Text(text) => out.push_str(text),
                NodeType::Document | NodeType::Element(_) => {
                    for child in &node.children {
                        self.collect_text(*child, out);
                    }
                }
            }
        })
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node_id, &mut out);
        out
    }

    fn write_node(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            let Some(node) = self.node(node_id) else {
                return;
            };
            match &node.node_type {
                NodeType::Document => {
                    for child in &node.children {
                        self.write_node(*child, out);
                    }
                }
                NodeType::Text(text) => out.push_str(&escape_html_text_for_serialization(text)),
                NodeType::Element(element) => {
                    out.push('<');
                    out.push_str(&element.tag_name);
                    for name in &element.attr_order {
                        if let Some(value) = element.attrs.get(name) {
                            out.push(' ');
                            out.push_str(name);
                            out.push_str("=\"");
                            out.push_str(&escape_html_attr_for_serialization(value));
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if is_void_tag(&element.tag_name) {
                        return;
                    }
                    for child in &node.children {
                        self.write_node(*child, out);
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                }
            }
        })
    }

    /// Short `tag#id.class` label used in trace lines.
    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return if node_id == self.root {
                "#document".to_string()
            } else {
                "#text".to_string()
            };
        };
        let mut label = element.tag_name.clone();
        if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
            label.push('#');
            label.push_str(id);
        }
        for class_name in class_tokens(element.attr("class")) {
            label.push('.');
            label.push_str(&class_name);
        }
        label
    }
}
