//! Triple collection with blank-node-aware comparison

use crate::term::{BlankNode, Subject, Term};
use crate::triple::Triple;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Write as _;

/// An in-memory bag of triples
///
/// Readers do not produce a `Graph` themselves; collect one with
/// [`TripleCollector`](crate::TripleCollector) or by passing a `Graph` as the
/// sink. Duplicates are kept; call [`dedupe`](Graph::dedupe) for set semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triples: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Sort by (subject, predicate, object)
    pub fn sort(&mut self) {
        self.triples.sort();
    }

    /// Sort, then drop duplicate triples
    pub fn dedupe(&mut self) {
        self.sort();
        self.triples.dedup();
    }

    /// N-Triples rendering, one triple per line
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for t in &self.triples {
            let _ = writeln!(out, "{t}");
        }
        out
    }

    /// Whether both graphs hold the same triple multiset up to a renaming of
    /// blank nodes.
    ///
    /// Backtracking search over blank node bijections, pruned by a per-node
    /// signature of the ground terms and predicates each node touches. Fine
    /// for test-sized graphs; highly symmetric blank structures are
    /// exponential.
    pub fn isomorphic(&self, other: &Graph) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let (ground_a, blank_a): (Vec<&Triple>, Vec<&Triple>) =
            self.triples.iter().partition(|t| !t.has_blank());
        let (ground_b, blank_b): (Vec<&Triple>, Vec<&Triple>) =
            other.triples.iter().partition(|t| !t.has_blank());
        if counts(ground_a.iter().copied()) != counts(ground_b.iter().copied()) {
            return false;
        }

        let sig_a = signatures(&blank_a);
        let sig_b = signatures(&blank_b);
        if sig_a.len() != sig_b.len() {
            return false;
        }
        let mut sorted_a: Vec<&Signature> = sig_a.values().collect();
        let mut sorted_b: Vec<&Signature> = sig_b.values().collect();
        sorted_a.sort();
        sorted_b.sort();
        if sorted_a != sorted_b {
            return false;
        }

        let mut order: Vec<(BlankNode, Vec<BlankNode>)> = sig_a
            .iter()
            .map(|(node, sig)| {
                let mut cands: Vec<BlankNode> = sig_b
                    .iter()
                    .filter(|(_, s)| *s == sig)
                    .map(|(n, _)| n.clone())
                    .collect();
                cands.sort();
                (node.clone(), cands)
            })
            .collect();
        order.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.0.cmp(&b.0)));

        let mut by_node: FxHashMap<BlankNode, Vec<Triple>> = FxHashMap::default();
        for t in &blank_a {
            for node in blanks_of(t) {
                by_node.entry(node).or_default().push((*t).clone());
            }
        }

        let mut matcher = Matcher {
            order,
            by_node,
            source: blank_a.into_iter().cloned().collect(),
            target: counts(blank_b.into_iter()),
            mapping: FxHashMap::default(),
            used: FxHashSet::default(),
        };
        matcher.search(0)
    }
}

type Signature = Vec<(u8, String, Option<String>)>;

fn counts<'a>(triples: impl Iterator<Item = &'a Triple>) -> FxHashMap<Triple, usize> {
    let mut map = FxHashMap::default();
    for t in triples {
        *map.entry(t.clone()).or_insert(0) += 1;
    }
    map
}

fn blanks_of(t: &Triple) -> Vec<BlankNode> {
    let mut nodes = Vec::with_capacity(2);
    if let Subject::Blank(b) = &t.subject {
        nodes.push(b.clone());
    }
    if let Term::Blank(b) = &t.object {
        if !nodes.contains(b) {
            nodes.push(b.clone());
        }
    }
    nodes
}

/// Role 0: subject, 1: object, 2: both. The neighbour is `None` when blank.
fn signatures(triples: &[&Triple]) -> FxHashMap<BlankNode, Signature> {
    let mut sigs: FxHashMap<BlankNode, Signature> = FxHashMap::default();
    for t in triples {
        let pred = t.predicate.as_str().to_string();
        match (&t.subject, &t.object) {
            (Subject::Blank(s), Term::Blank(o)) if s == o => {
                sigs.entry(s.clone()).or_default().push((2, pred, None));
            }
            (Subject::Blank(s), object) => {
                let neighbour = (!object.is_blank()).then(|| object.to_string());
                sigs.entry(s.clone()).or_default().push((0, pred.clone(), neighbour));
                if let Term::Blank(o) = object {
                    sigs.entry(o.clone()).or_default().push((1, pred, None));
                }
            }
            (subject, Term::Blank(o)) => {
                sigs.entry(o.clone())
                    .or_default()
                    .push((1, pred, Some(subject.to_string())));
            }
            _ => {}
        }
    }
    for sig in sigs.values_mut() {
        sig.sort();
    }
    sigs
}

struct Matcher {
    order: Vec<(BlankNode, Vec<BlankNode>)>,
    by_node: FxHashMap<BlankNode, Vec<Triple>>,
    source: Vec<Triple>,
    target: FxHashMap<Triple, usize>,
    mapping: FxHashMap<BlankNode, BlankNode>,
    used: FxHashSet<BlankNode>,
}

impl Matcher {
    fn search(&mut self, depth: usize) -> bool {
        if depth == self.order.len() {
            return self.complete();
        }
        let (node, candidates) = self.order[depth].clone();
        for cand in candidates {
            if self.used.contains(&cand) {
                continue;
            }
            self.mapping.insert(node.clone(), cand.clone());
            self.used.insert(cand.clone());
            if self.consistent(&node) && self.search(depth + 1) {
                return true;
            }
            self.mapping.remove(&node);
            self.used.remove(&cand);
        }
        false
    }

    /// Every fully mapped triple touching `node` exists in the target.
    fn consistent(&self, node: &BlankNode) -> bool {
        self.by_node.get(node).map_or(true, |triples| {
            triples.iter().all(|t| match self.map(t) {
                Some(mapped) => self.target.contains_key(&mapped),
                None => true,
            })
        })
    }

    fn complete(&self) -> bool {
        let mut mapped = Vec::with_capacity(self.source.len());
        for t in &self.source {
            match self.map(t) {
                Some(m) => mapped.push(m),
                None => return false,
            }
        }
        counts(mapped.iter()) == self.target
    }

    fn map(&self, t: &Triple) -> Option<Triple> {
        let subject = match &t.subject {
            Subject::Blank(b) => Subject::Blank(self.mapping.get(b)?.clone()),
            s => s.clone(),
        };
        let object = match &t.object {
            Term::Blank(b) => Term::Blank(self.mapping.get(b)?.clone()),
            o => o.clone(),
        };
        Some(Triple {
            subject,
            predicate: t.predicate.clone(),
            object,
        })
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}
