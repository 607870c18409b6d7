//! Edge-compressed radix trie.
//!
//! One `Tree` per HTTP method. Each node carries a string fragment (the
//! edge text from its parent) or the single byte `:` for a parameter node.
//! Insertion splits fragments on divergence and keeps siblings sorted so
//! lookup can try them in specificity order; lookup walks the path bytes,
//! capturing parameter segments and the wildcard tail as subslices of the
//! request path.
//!
//! The tree is built once during registration and never mutated afterwards:
//! every node exclusively owns its children, lookups take `&self`, and there
//! is no interior mutability anywhere below the root.

use regex::Regex;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::dispatcher::Handler;
use crate::error::RouteError;
use crate::pattern::{Atom, RoutePattern};
use crate::router::core::MAX_INLINE_PARAMS;
use http::Method;

/// Parameter values captured during one lookup, in path order. Subslices of
/// the request path; nothing is copied until a route actually matches.
pub(crate) type CaptureVec<'p> = SmallVec<[&'p str; MAX_INLINE_PARAMS]>;

/// A node of the trie.
#[derive(Clone)]
pub(crate) struct Node {
    /// Edge text from the parent, or `:` for a parameter node. Never empty.
    fragment: String,
    /// Name-to-segment-index table of the pattern terminating here, sorted
    /// by index. Empty unless this node carries a handler for a pattern
    /// with parameters. Contains `"*"` iff that pattern is a wildcard.
    params: Vec<(Arc<str>, u16)>,
    /// Constraint of a parameter node; `None` everywhere else.
    constraint: Option<Arc<Regex>>,
    children: Vec<Node>,
    handler: Option<Arc<dyn Handler>>,
    /// Set where the bare `/` route terminates. The root route ends in a
    /// slash without being a wildcard, so the matcher must not promote it
    /// to a catch-all. Preserved through splits, never set deeper.
    is_root: bool,
}

/// Per-method trie root.
#[derive(Clone, Default)]
pub(crate) struct Tree {
    children: Vec<Node>,
}

impl Tree {
    /// Insert a parsed pattern, attaching `handler` at the terminal node.
    pub(crate) fn insert(
        &mut self,
        route: &RoutePattern,
        method: &Method,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RouteError> {
        insert_atoms(&mut self.children, &route.atoms(), route, method, &handler)
    }

    /// Find the deepest node compatible with `path`, filling `captures`
    /// with parameter values along the winning descent. The returned node
    /// may lack a handler; callers decide what that means.
    pub(crate) fn find<'t, 'p>(
        &'t self,
        path: &'p str,
        captures: &mut CaptureVec<'p>,
    ) -> Option<&'t Node> {
        find_in(&self.children, path, captures)
    }
}

impl Node {
    fn literal(fragment: &str) -> Self {
        Node {
            fragment: fragment.to_string(),
            params: Vec::new(),
            constraint: None,
            children: Vec::new(),
            handler: None,
            is_root: false,
        }
    }

    fn parameter(constraint: Option<Arc<Regex>>) -> Self {
        Node {
            fragment: ":".to_string(),
            params: Vec::new(),
            constraint,
            children: Vec::new(),
            handler: None,
            is_root: false,
        }
    }

    pub(crate) fn handler(&self) -> Option<&Arc<dyn Handler>> {
        self.handler.as_ref()
    }

    pub(crate) fn params(&self) -> &[(Arc<str>, u16)] {
        &self.params
    }

    fn is_parameter(&self) -> bool {
        self.fragment == ":"
    }

    /// A fragment ending in `/` can absorb the rest of a path as the
    /// wildcard tail.
    fn is_wildcard(&self) -> bool {
        self.fragment.ends_with('/')
    }

    /// Transitive descendant count, used by the sibling sort.
    fn count_descendants(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.count_descendants())
            .sum()
    }

    /// Split this node at byte `at`: the node keeps the prefix (and its
    /// position in the parent, including the root flag), while its former
    /// content moves into a single new child carrying the suffix.
    fn split(&mut self, at: usize) {
        let suffix = self.fragment.split_off(at);
        let moved = Node {
            fragment: suffix,
            params: mem::take(&mut self.params),
            constraint: self.constraint.take(),
            children: mem::take(&mut self.children),
            handler: self.handler.take(),
            is_root: false,
        };
        self.children.push(moved);
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{:?}", "", self.fragment, indent = depth * 2)?;
        if !self.params.is_empty() {
            write!(f, "  {:?}", self.params)?;
        }
        if let Some(re) = &self.constraint {
            write!(f, "  <{}>", re.as_str())?;
        }
        if self.handler.is_some() {
            write!(f, "  handler")?;
        }
        if self.is_root {
            write!(f, "  root")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.children {
            node.fmt_tree(f, 1)?;
        }
        Ok(())
    }
}

/// Attach a handler at `node`, the terminal of `route`.
fn attach(
    node: &mut Node,
    route: &RoutePattern,
    method: &Method,
    handler: &Arc<dyn Handler>,
) -> Result<(), RouteError> {
    if node.handler.is_some() {
        return Err(RouteError::DuplicateRoute {
            method: method.clone(),
            pattern: route.raw().to_string(),
        });
    }
    node.params = route.params().to_vec();
    node.handler = Some(Arc::clone(handler));
    if route.is_bare_root() {
        node.is_root = true;
    }
    Ok(())
}

fn same_constraint(a: Option<&Arc<Regex>>, b: Option<&Arc<Regex>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.as_str() == b.as_str(),
        _ => false,
    }
}

/// Recursive insertion step. Re-sorts this sibling level on the way out so
/// the ordering invariant holds after every structural change.
fn insert_atoms(
    children: &mut Vec<Node>,
    atoms: &[Atom<'_>],
    route: &RoutePattern,
    method: &Method,
    handler: &Arc<dyn Handler>,
) -> Result<(), RouteError> {
    let result = insert_atoms_inner(children, atoms, route, method, handler);
    sort_children(children);
    result
}

fn insert_atoms_inner(
    children: &mut Vec<Node>,
    atoms: &[Atom<'_>],
    route: &RoutePattern,
    method: &Method,
    handler: &Arc<dyn Handler>,
) -> Result<(), RouteError> {
    let Some((first, rest)) = atoms.split_first() else {
        return Ok(());
    };

    match *first {
        Atom::Parameter(constraint) => {
            // A `:` step converges only on the sibling with the identical
            // constraint source; distinct constraints coexist as siblings.
            if let Some(child) = children
                .iter_mut()
                .find(|c| c.is_parameter() && same_constraint(c.constraint.as_ref(), constraint))
            {
                if rest.is_empty() {
                    return attach(child, route, method, handler);
                }
                return insert_atoms(&mut child.children, rest, route, method, handler);
            }
            let mut node = Node::parameter(constraint.cloned());
            if rest.is_empty() {
                attach(&mut node, route, method, handler)?;
            } else {
                insert_atoms(&mut node.children, rest, route, method, handler)?;
            }
            children.push(node);
            Ok(())
        }
        Atom::Literal(text) => insert_literal(children, text, rest, route, method, handler),
    }
}

fn insert_literal(
    children: &mut Vec<Node>,
    text: &str,
    rest: &[Atom<'_>],
    route: &RoutePattern,
    method: &Method,
    handler: &Arc<dyn Handler>,
) -> Result<(), RouteError> {
    for child in children.iter_mut() {
        // Literal text never contains `:`, so it cannot share a first byte
        // with a parameter sibling.
        if child.is_parameter() {
            continue;
        }
        let common = common_prefix(&child.fragment, text);
        if common == 0 {
            continue;
        }
        if common < child.fragment.len() {
            // Divergence inside the fragment (or the new text ends there):
            // split so the child keeps the shared prefix.
            child.split(common);
        }
        let remainder = &text[common..];
        if remainder.is_empty() {
            if rest.is_empty() {
                return attach(child, route, method, handler);
            }
            return insert_atoms(&mut child.children, rest, route, method, handler);
        }
        // The child fragment fully matched a prefix of the text: descend
        // with the leftover run and whatever atoms follow it.
        let mut sub: Vec<Atom<'_>> = Vec::with_capacity(rest.len() + 1);
        sub.push(Atom::Literal(remainder));
        sub.extend_from_slice(rest);
        return insert_atoms(&mut child.children, &sub, route, method, handler);
    }

    // No sibling shares a first byte: append.
    let mut node = Node::literal(text);
    if rest.is_empty() {
        attach(&mut node, route, method, handler)?;
    } else {
        insert_atoms(&mut node.children, rest, route, method, handler)?;
    }
    children.push(node);
    Ok(())
}

/// Length of the common prefix of `a` and `b`, floored to a char boundary
/// so fragment splits never land inside a multi-byte character.
fn common_prefix(a: &str, b: &str) -> usize {
    let mut i = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while i > 0 && !a.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Sibling order: literals before parameters; constrained parameters before
/// the unconstrained one; among literals, more transitive descendants first.
/// The sort is stable, so ties keep insertion order.
fn sort_children(children: &mut [Node]) {
    children.sort_by(|a, b| match (a.is_parameter(), b.is_parameter()) {
        (false, false) => b.count_descendants().cmp(&a.count_descendants()),
        (true, true) => b.constraint.is_some().cmp(&a.constraint.is_some()),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
    });
}

/// Depth-first lookup over one sibling level.
fn find_in<'t, 'p>(
    children: &'t [Node],
    path: &'p str,
    captures: &mut CaptureVec<'p>,
) -> Option<&'t Node> {
    for child in children {
        if child.is_parameter() {
            match path.find('/') {
                None => {
                    // The parameter spans the whole residual.
                    if let Some(re) = &child.constraint {
                        if !re.is_match(path) {
                            continue;
                        }
                    }
                    captures.push(path);
                    return Some(child);
                }
                Some(end) => {
                    if let Some(re) = &child.constraint {
                        if !re.is_match(&path[..end]) {
                            continue;
                        }
                    }
                    captures.push(&path[..end]);
                    return find_in(&child.children, &path[end..], captures);
                }
            }
        }
        if !path.starts_with(child.fragment.as_str()) {
            continue;
        }
        if path.len() == child.fragment.len() {
            return Some(child);
        }
        let mark = captures.len();
        let rest = &path[child.fragment.len()..];
        match find_in(&child.children, rest, captures) {
            Some(found) if found.handler.is_some() => return Some(found),
            _ => {
                // Dead end below: rewind captures, then either absorb the
                // residual as the wildcard tail or backtrack to the next
                // sibling (a parameter may still match).
                captures.truncate(mark);
                if !child.is_root && child.is_wildcard() {
                    captures.push(rest);
                    return Some(child);
                }
            }
        }
    }
    None
}
