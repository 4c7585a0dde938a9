//! Host-neutral virtual node tree.
//!
//! Engines never talk to real widgets. They return a [`Node`] tree whose
//! element tags (`Form`, `Input`, `Table`, `Modal`, ...) a host maps onto its
//! widget set. Event handlers are async closures receiving the raw event
//! arguments as JSON.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{self, FutureExt};
use serde_json::{Map, Value};

use crate::lifecycle::Task;

/// Event handler attached to an element.
pub type Handler = Rc<dyn Fn(&[Value]) -> Task>;

/// Named render slot parameterized by its binding argument.
pub type Slot<A> = Rc<dyn Fn(&A) -> Node>;

/// Named slots keyed by slot name.
pub type Slots<A> = BTreeMap<String, Slot<A>>;

/// Build a [`Handler`] from an async closure.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Vec<Value>) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    Rc::new(move |args: &[Value]| f(args.to_vec()).boxed_local())
}

/// Build a [`Handler`] that completes synchronously.
pub fn sync_handler(f: impl Fn(&[Value]) + 'static) -> Handler {
    Rc::new(move |args: &[Value]| {
        f(args);
        future::ready(()).boxed_local()
    })
}

/// Render every slot in `slots` against `arg`.
pub fn render_slots<A>(slots: &Slots<A>, arg: &A) -> BTreeMap<String, Node> {
    slots
        .iter()
        .map(|(name, slot)| (name.clone(), slot(arg)))
        .collect()
}

/// A single element of the tree.
#[derive(Clone, Default)]
pub struct Element {
    pub tag: Cow<'static, str>,
    pub key: Option<String>,
    pub props: Map<String, Value>,
    pub handlers: BTreeMap<String, Handler>,
    pub children: Vec<Node>,
    pub slots: BTreeMap<String, Node>,
}

impl Element {
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Invoke the handler registered for `event`, if any.
    pub fn emit(&self, event: &str, args: &[Value]) -> Task {
        match self.handlers.get(event) {
            Some(handler) => handler(args),
            None => future::ready(()).boxed_local(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<&Node> {
        self.slots.get(name)
    }

    /// Concatenated text of children and slots, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        for slot in self.slots.values() {
            slot.collect_text(&mut out);
        }
        out
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("tag", &self.tag);
        if let Some(key) = &self.key {
            s.field("key", key);
        }
        s.field("props", &self.props)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("children", &self.children);
        if !self.slots.is_empty() {
            s.field("slots", &self.slots);
        }
        s.finish()
    }
}

/// A node of the render tree.
#[derive(Clone, Debug, Default)]
pub enum Node {
    #[default]
    Empty,
    Text(String),
    Element(Box<Element>),
    Fragment(Vec<Node>),
}

impl Node {
    pub fn element(tag: impl Into<Cow<'static, str>>) -> Self {
        Node::Element(Box::new(Element {
            tag: tag.into(),
            ..Element::default()
        }))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(children.into_iter().collect())
    }

    fn with_element(mut self, f: impl FnOnce(&mut Element)) -> Self {
        if let Node::Element(element) = &mut self {
            f(element);
        }
        self
    }

    pub fn key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_element(|e| e.key = Some(key))
    }

    /// Attach `key`, wrapping non-element nodes so the key is not lost.
    pub fn keyed(self, key: impl Into<String>) -> Self {
        match self {
            Node::Element(_) => self.key(key),
            other => Node::element("Fragment").key(key).child(other),
        }
    }

    pub fn prop(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.with_element(|e| {
            e.props.insert(name, value);
        })
    }

    /// Merge every entry of a JSON object into the props. Later writes win.
    pub fn props(self, props: Value) -> Self {
        self.with_element(|e| {
            if let Value::Object(map) = props {
                e.props.extend(map);
            }
        })
    }

    pub fn on(self, event: impl Into<String>, handler: Handler) -> Self {
        let event = event.into();
        self.with_element(|e| {
            e.handlers.insert(event, handler);
        })
    }

    pub fn child(self, child: Node) -> Self {
        self.with_element(|e| e.children.push(child))
    }

    pub fn children(self, children: impl IntoIterator<Item = Node>) -> Self {
        self.with_element(|e| e.children.extend(children))
    }

    pub fn slot(self, name: impl Into<String>, node: Node) -> Self {
        let name = name.into();
        self.with_element(|e| {
            e.slots.insert(name, node);
        })
    }

    pub fn slots(self, slots: BTreeMap<String, Node>) -> Self {
        self.with_element(|e| e.slots.extend(slots))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Depth-first walk over every element, children before slots.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        match self {
            Node::Element(element) => {
                visit(element);
                for child in &element.children {
                    child.walk(visit);
                }
                for slot in element.slots.values() {
                    slot.walk(visit);
                }
            }
            Node::Fragment(children) => {
                for child in children {
                    child.walk(visit);
                }
            }
            Node::Empty | Node::Text(_) => {}
        }
    }

    /// First element matching `predicate`, cloned out of the tree.
    pub fn find(&self, predicate: impl Fn(&Element) -> bool) -> Option<Element> {
        let mut found = None;
        self.walk(&mut |element| {
            if found.is_none() && predicate(element) {
                found = Some(element.clone());
            }
        });
        found
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<Element> {
        self.find(|e| e.tag == tag)
    }

    pub fn find_all(&self, predicate: impl Fn(&Element) -> bool) -> Vec<Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if predicate(element) {
                found.push(element.clone());
            }
        });
        found
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Element> {
        self.find_all(|e| e.tag == tag)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => out.push_str(&element.text()),
            Node::Fragment(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Empty => {}
        }
    }
}
