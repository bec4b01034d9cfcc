//! Document abstraction and an in-memory HTML document.
//!
//! [`Document`] is the capability a view needs from a page: find every
//! element matching a selector list, and replace an element's content with
//! parsed markup. [`HtmlDocument`] implements it on top of `scraper`
//! (html5ever parsing and serialization, `selectors` matching) so views can
//! be rendered outside a browser.
//!
//! # Example
//!
//! ```rust
//! use tungsten_view::{Document, HtmlDocument};
//!
//! let doc = HtmlDocument::parse(r#"<main><p class="slot"></p><p class="slot"></p></main>"#);
//! for node in doc.query_selector_all("main .slot").unwrap() {
//!     doc.set_inner_html(node, "<b>hi</b>").unwrap();
//! }
//! assert_eq!(
//!     doc.to_html(),
//!     r#"<main><p class="slot"><b>hi</b></p><p class="slot"><b>hi</b></p></main>"#
//! );
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use ego_tree::Tree;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, trace};

use crate::error::{DomError, DomResult};

/// Detached nodes tolerated before the arena is rebuilt.
const COMPACT_THRESHOLD: usize = 64;

type TreeId = ego_tree::NodeId;

/// Identifies an element of a document.
///
/// Ids are never reused; once an element is removed from the tree its id is
/// reported as [`DomError::StaleNode`] from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Mint an id. Only meaningful to the document that hands it out.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The page capability consumed by [`View::render`](crate::view::View::render).
///
/// Like a browser DOM it is used from one thread; implementations mutate
/// through `&self`.
#[cfg_attr(test, mockall::automock)]
pub trait Document {
    /// Every element matching `selectors`, in document order, each once.
    fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<NodeId>>;

    /// Replace the children of `node` with the nodes parsed from `markup`.
    fn set_inner_html(&self, node: NodeId, markup: &str) -> DomResult<()>;
}

/// Public ids for arena nodes that have been handed out.
#[derive(Default)]
struct Handles {
    next: usize,
    by_tree: HashMap<TreeId, NodeId>,
    by_handle: HashMap<NodeId, TreeId>,
}

impl Handles {
    fn mint(&mut self, id: TreeId) -> NodeId {
        if let Some(&handle) = self.by_tree.get(&id) {
            return handle;
        }
        let handle = NodeId(self.next);
        self.next += 1;
        self.by_tree.insert(id, handle);
        self.by_handle.insert(handle, id);
        handle
    }

    fn resolve(&self, handle: NodeId) -> DomResult<TreeId> {
        self.by_handle
            .get(&handle)
            .copied()
            .ok_or(DomError::StaleNode(handle))
    }

    fn forget(&mut self, id: TreeId) {
        if let Some(handle) = self.by_tree.remove(&id) {
            self.by_handle.remove(&handle);
        }
    }

    /// Point every surviving handle at its node's new position.
    fn remap(&mut self, moved: &HashMap<TreeId, TreeId>) {
        let by_handle: HashMap<NodeId, TreeId> = self
            .by_handle
            .drain()
            .filter_map(|(handle, old)| moved.get(&old).map(|&new| (handle, new)))
            .collect();
        self.by_tree = by_handle.iter().map(|(&handle, &id)| (id, handle)).collect();
        self.by_handle = by_handle;
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.by_handle.len()
    }
}

struct State {
    html: Html,
    handles: Handles,
    /// Nodes detached from the tree but still held by the arena.
    orphaned: usize,
}

impl State {
    fn element(&self, handle: NodeId) -> DomResult<ElementRef<'_>> {
        let id = self.handles.resolve(handle)?;
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .ok_or(DomError::StaleNode(handle))
    }

    /// Detach the children of `target`, forgetting every handle beneath it.
    fn clear_children(&mut self, target: TreeId) {
        let children: Vec<TreeId> = match self.html.tree.get(target) {
            Some(node) => node.children().map(|child| child.id()).collect(),
            None => return,
        };
        for child in children {
            if let Some(subtree) = self.html.tree.get(child) {
                for node in subtree.descendants() {
                    self.handles.forget(node.id());
                    self.orphaned += 1;
                }
            }
            if let Some(mut node) = self.html.tree.get_mut(child) {
                node.detach();
            }
        }
    }

    /// Rebuild the arena from the attached nodes only.
    fn compact(&mut self) {
        let old = &self.html.tree;
        let mut tree = Tree::new(old.root().value().clone());
        let root = tree.root().id();
        let mut moved = copy_children(old, old.root().id(), &mut tree, root);
        moved.insert(old.root().id(), root);

        debug!(
            orphaned = self.orphaned,
            live = moved.len(),
            "compacting document arena"
        );
        self.handles.remap(&moved);
        self.html.tree = tree;
        self.orphaned = 0;
    }
}

/// Append copies of the children of `from` (in `source`) under `to` (in
/// `dest`), walking with an explicit stack. Returns old id to new id.
fn copy_children(
    source: &Tree<Node>,
    from: TreeId,
    dest: &mut Tree<Node>,
    to: TreeId,
) -> HashMap<TreeId, TreeId> {
    let mut moved = HashMap::new();
    let mut pending = vec![(from, to)];

    while let Some((from, to)) = pending.pop() {
        let Some(node) = source.get(from) else {
            continue;
        };
        for child in node.children() {
            let Some(mut parent) = dest.get_mut(to) else {
                break;
            };
            let copy = parent.append(child.value().clone()).id();
            moved.insert(child.id(), copy);
            pending.push((child.id(), copy));
        }
    }
    moved
}

/// An HTML document held in memory.
///
/// Created either from a fragment ([`HtmlDocument::parse`]), which serializes
/// back without `html`/`head`/`body` wrappers, or from a whole page
/// ([`HtmlDocument::parse_document`]). Mutation goes through `&self`, so
/// several renders on one task can target the same document; writes from
/// overlapping renders land in whatever order they happen and the last one
/// wins.
pub struct HtmlDocument {
    state: RefCell<State>,
    fragment: bool,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("fragment", &self.fragment)
            .field("html", &self.to_html())
            .finish()
    }
}

impl HtmlDocument {
    /// Create an empty fragment document.
    pub fn new() -> Self {
        Self::parse("")
    }

    /// Parse a fragment, as the content of a `body` element.
    pub fn parse(markup: &str) -> Self {
        Self::from_html(Html::parse_fragment(markup), true)
    }

    /// Parse a complete page, including doctype, `head` and `body`.
    pub fn parse_document(markup: &str) -> Self {
        Self::from_html(Html::parse_document(markup), false)
    }

    fn from_html(html: Html, fragment: bool) -> Self {
        Self {
            state: RefCell::new(State {
                html,
                handles: Handles::default(),
                orphaned: 0,
            }),
            fragment,
        }
    }

    /// First element matching `selectors`, if any.
    pub fn query_selector(&self, selectors: &str) -> DomResult<Option<NodeId>> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut state = self.state.borrow_mut();
        let found = state
            .html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().id() == Some(id))
            .map(|element| element.id())?;
        Some(state.handles.mint(found))
    }

    /// Whether `node` is still part of the tree.
    pub fn contains(&self, node: NodeId) -> bool {
        self.state.borrow().element(node).is_ok()
    }

    pub fn tag_name(&self, node: NodeId) -> DomResult<String> {
        let state = self.state.borrow();
        Ok(state.element(node)?.value().name().to_string())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        let state = self.state.borrow();
        let element = state.element(node)?;
        Ok(element
            .value()
            .attr(&name.to_ascii_lowercase())
            .map(str::to_string))
    }

    /// Serialized children of `node`.
    pub fn inner_html(&self, node: NodeId) -> DomResult<String> {
        Ok(self.state.borrow().element(node)?.inner_html())
    }

    /// Serialized `node`, including its own tag.
    pub fn outer_html(&self, node: NodeId) -> DomResult<String> {
        Ok(self.state.borrow().element(node)?.html())
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> DomResult<String> {
        Ok(self.state.borrow().element(node)?.text().collect())
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        let state = self.state.borrow();
        if self.fragment {
            state.html.root_element().inner_html()
        } else {
            state.html.html()
        }
    }
}

impl Document for HtmlDocument {
    fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selectors).map_err(|e| DomError::InvalidSelector {
            selectors: selectors.to_string(),
            message: e.to_string(),
        })?;

        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        // A fragment's synthetic `html` wrapper is not part of the page.
        let found: Vec<TreeId> = if self.fragment {
            state
                .html
                .root_element()
                .select(&selector)
                .map(|element| element.id())
                .collect()
        } else {
            state
                .html
                .select(&selector)
                .map(|element| element.id())
                .collect()
        };
        let matched: Vec<NodeId> = found
            .into_iter()
            .map(|id| state.handles.mint(id))
            .collect();

        trace!(selectors, matched = matched.len(), "query_selector_all");
        Ok(matched)
    }

    fn set_inner_html(&self, node: NodeId, markup: &str) -> DomResult<()> {
        let parsed = Html::parse_fragment(markup);
        let mut state = self.state.borrow_mut();
        let target = state.element(node)?.id();

        state.clear_children(target);
        copy_children(
            &parsed.tree,
            parsed.root_element().id(),
            &mut state.html.tree,
            target,
        );

        if state.orphaned > COMPACT_THRESHOLD
            && state.orphaned > state.html.tree.root().descendants().count()
        {
            state.compact();
        }
        Ok(())
    }
}
