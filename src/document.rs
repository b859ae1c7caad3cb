//! Page document seam
//!
//! The bridge only touches the page through a handful of well-known elements.
//! `Document` is that surface; `MemoryDocument` is an in-memory element tree
//! used by headless hosts and tests.

use std::collections::BTreeMap;

/// Element holding the raw text content
pub const CONTENT_ID: &str = "content";
/// Mount point of the structure-aware editor
pub const MOUNT_ID: &str = "paren-soup";
/// Line-number gutter inside the mount point
pub const GUTTER_ID: &str = "numbers";
/// Inline evaluation-result panel
pub const INSTAREPL_ID: &str = "instarepl";
/// Console output panel
pub const OUTPUT_ID: &str = "output";

/// Description of an element to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: String,
    pub class: Option<String>,
}

impl ElementSpec {
    pub fn div(id: &str) -> Self {
        Self {
            tag: "div".to_string(),
            id: id.to_string(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

/// DOM operations the bridge needs from its page.
///
/// Every method that targets an id is a no-op (or returns `None`/`false`)
/// when the element does not exist.
pub trait Document {
    fn contains(&self, id: &str) -> bool;

    fn text_content(&self, id: &str) -> Option<String>;

    fn set_text_content(&mut self, id: &str, text: &str) -> bool;

    fn style(&self, id: &str, property: &str) -> Option<String>;

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool;

    fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        self.set_style(id, "display", if hidden { "none" } else { "" })
    }

    fn focus(&mut self, id: &str) -> bool;

    /// Append a new element to `parent`, or to the body when `parent` is `None`
    fn append_element(&mut self, parent: Option<&str>, element: ElementSpec) -> bool;

    /// Insert a new element into `parent`, immediately before `reference`
    fn insert_before(&mut self, parent: &str, element: ElementSpec, reference: &str) -> bool;

    fn remove(&mut self, id: &str) -> bool;

    /// Scroll an element so its last line is visible
    fn scroll_to_bottom(&mut self, id: &str) -> bool;

    /// Replace the stylesheet link in the head, leaving exactly one
    fn replace_stylesheet(&mut self, href: &str);

    fn stylesheets(&self) -> Vec<String>;
}

type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    id: Option<String>,
    class: Option<String>,
    text: String,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    scroll_top: usize,
    detached: bool,
}

impl Node {
    fn new(id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            class: None,
            text: String::new(),
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            scroll_top: 0,
            detached: false,
        }
    }
}

/// In-memory page: an element arena rooted at `body`, plus the head's stylesheet links.
///
/// Removed subtrees return their slots to a free list, so repeated
/// insert/remove cycles do not grow the arena.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    links: Vec<String>,
    focused: Option<String>,
}

const BODY: NodeId = 0;

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty page with a body and no stylesheet
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None)],
            free: Vec::new(),
            links: Vec::new(),
            focused: None,
        }
    }

    /// Page layout of the generic editor: the content holder directly in the body
    pub fn generic_page(text: &str) -> Self {
        let mut doc = Self::new();
        doc.append_child(BODY, CONTENT_ID);
        doc.set_text_content(CONTENT_ID, text);
        doc.links.push("codemirror.css".to_string());
        doc
    }

    /// Page layout of the structure-aware editor:
    /// `#paren-soup > (#numbers, #content)` and an `#output` panel
    pub fn structured_page(text: &str) -> Self {
        let mut doc = Self::new();
        let mount = doc.append_child(BODY, MOUNT_ID);
        doc.append_child(mount, GUTTER_ID);
        doc.append_child(mount, CONTENT_ID);
        doc.append_child(BODY, OUTPUT_ID);
        doc.set_text_content(CONTENT_ID, text);
        doc.links.push("paren-soup-light.css".to_string());
        doc
    }

    /// Store a detached node, reusing a freed slot when there is one
    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn append_child(&mut self, parent: NodeId, id: &str) -> NodeId {
        let mut node = Node::new(Some(id));
        node.parent = Some(parent);
        let child = self.alloc(node);
        self.nodes[parent].children.push(child);
        child
    }

    fn find(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| !n.detached && n.id.as_deref() == Some(id))
    }

    /// Ids of `parent`'s children, in document order
    pub fn child_ids(&self, parent: &str) -> Vec<String> {
        let Some(parent) = self.find(parent) else {
            return Vec::new();
        };
        self.nodes[parent]
            .children
            .iter()
            .filter_map(|&c| self.nodes[c].id.clone())
            .collect()
    }

    pub fn class_of(&self, id: &str) -> Option<String> {
        self.find(id).and_then(|n| self.nodes[n].class.clone())
    }

    /// Arena slots in use or waiting for reuse
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of attached elements carrying `id`
    pub fn count(&self, id: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| !n.detached && n.id.as_deref() == Some(id))
            .count()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Scroll offset in lines
    pub fn scroll_top(&self, id: &str) -> Option<usize> {
        self.find(id).map(|n| self.nodes[n].scroll_top)
    }

    /// Height of an element's content, in lines, including its descendants
    pub fn scroll_height(&self, id: &str) -> Option<usize> {
        self.find(id).map(|n| self.line_count(n))
    }

    fn line_count(&self, node: NodeId) -> usize {
        let own = self.nodes[node].text.lines().count();
        own + self.nodes[node]
            .children
            .iter()
            .map(|&c| self.line_count(c))
            .sum::<usize>()
    }
}

impl Document for MemoryDocument {
    fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    fn text_content(&self, id: &str) -> Option<String> {
        self.find(id).map(|n| self.nodes[n].text.clone())
    }

    fn set_text_content(&mut self, id: &str, text: &str) -> bool {
        match self.find(id) {
            Some(n) => {
                self.nodes[n].text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.find(id)
            .and_then(|n| self.nodes[n].style.get(property).cloned())
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool {
        let Some(n) = self.find(id) else {
            return false;
        };
        if value.is_empty() {
            self.nodes[n].style.remove(property);
        } else {
            self.nodes[n]
                .style
                .insert(property.to_string(), value.to_string());
        }
        true
    }

    fn focus(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.focused = Some(id.to_string());
            true
        } else {
            false
        }
    }

    fn append_element(&mut self, parent: Option<&str>, element: ElementSpec) -> bool {
        let parent = match parent {
            Some(id) => match self.find(id) {
                Some(n) => n,
                None => return false,
            },
            None => BODY,
        };
        let child = self.append_child(parent, &element.id);
        self.nodes[child].class = element.class;
        true
    }

    fn insert_before(&mut self, parent: &str, element: ElementSpec, reference: &str) -> bool {
        let (Some(parent), Some(reference)) = (self.find(parent), self.find(reference)) else {
            return false;
        };
        let Some(index) = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == reference)
        else {
            return false;
        };

        let mut node = Node::new(Some(&element.id));
        node.class = element.class;
        node.parent = Some(parent);
        let child = self.alloc(node);
        self.nodes[parent].children.insert(index, child);
        true
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(n) = self.find(id) else {
            return false;
        };
        if let Some(parent) = self.nodes[n].parent.take() {
            self.nodes[parent].children.retain(|&c| c != n);
        }
        let mut stack = vec![n];
        while let Some(node) = stack.pop() {
            self.nodes[node].detached = true;
            stack.extend(self.nodes[node].children.drain(..));
            self.free.push(node);
        }
        if self.focused.as_deref() == Some(id) {
            self.focused = None;
        }
        true
    }

    fn scroll_to_bottom(&mut self, id: &str) -> bool {
        let Some(n) = self.find(id) else {
            return false;
        };
        self.nodes[n].scroll_top = self.line_count(n);
        true
    }

    fn replace_stylesheet(&mut self, href: &str) {
        self.links.clear();
        self.links.push(href.to_string());
    }

    fn stylesheets(&self) -> Vec<String> {
        self.links.clone()
    }
}
