//! Document-scoped blank node allocation

use crate::term::BlankNode;
use rustc_hash::{FxHashMap, FxHashSet};

/// Blank node table for one parse.
///
/// Labels written in the document (`_:x`, `rdf:nodeID="x"`) map to the same
/// node for the remainder of the parse. Generated nodes are labelled
/// `b1`, `b2`, ... and never collide with a label the document uses.
#[derive(Debug, Default)]
pub struct BlankNodeScope {
    labels: FxHashMap<String, BlankNode>,
    used: FxHashSet<BlankNode>,
    counter: u64,
}

impl BlankNodeScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh, anonymous blank node.
    pub fn fresh(&mut self) -> BlankNode {
        loop {
            self.counter += 1;
            let node = BlankNode::new(format!("b{}", self.counter));
            if self.used.insert(node.clone()) {
                return node;
            }
        }
    }

    /// The node for a document label, allocated on first use.
    ///
    /// A label equal to an already generated name is relabelled: it gets the
    /// next fresh node (for example `_:b1` read after `b1` was generated
    /// becomes `b2`), so the two stay distinct. Every later use of the same
    /// document label returns that relabelled node, and a written document
    /// therefore may not reuse the label it was read with.
    pub fn labeled(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.labels.get(label) {
            return node.clone();
        }
        let candidate = BlankNode::new(label);
        let node = if self.used.insert(candidate.clone()) {
            candidate
        } else {
            self.fresh()
        };
        self.labels.insert(label.to_string(), node.clone());
        node
    }

    /// Number of distinct nodes handed out
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
