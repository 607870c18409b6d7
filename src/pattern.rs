//! Registration-pattern lexer.
//!
//! Turns a pattern like `/users/:id<[0-9]+>/files/` into the pieces the trie
//! inserter works with: a normalised trie path where every parameter is the
//! single byte `:`, the ordered parameter table (name to zero-based segment
//! index, with `*` standing for the wildcard tail of a trailing `/`), and
//! the compiled constraint for each parameter.

use regex::Regex;
use std::sync::Arc;

use crate::error::RouteError;

/// A parsed registration pattern.
///
/// Produced once per `handle` call and discarded after insertion; nothing in
/// the trie refers back to it.
#[derive(Debug, Clone)]
pub(crate) struct RoutePattern {
    raw: String,
    /// The pattern with every `:name<re>` collapsed to the single byte `:`.
    trie_path: String,
    /// Parameter names and their segment index, in path order. Ends with
    /// `("*", tail_index)` when the pattern is a wildcard.
    params: Vec<(Arc<str>, u16)>,
    /// One entry per `:` byte in `trie_path`, in path order.
    constraints: Vec<Option<Arc<Regex>>>,
}

/// One insertion step: a literal run of the trie path, or a parameter node
/// with its optional constraint.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Atom<'a> {
    Literal(&'a str),
    Parameter(Option<&'a Arc<Regex>>),
}

impl RoutePattern {
    /// Lex and validate a registration pattern.
    ///
    /// Constraints are compiled here, anchored to the whole segment, so a
    /// malformed regex is a registration error rather than a dispatch error.
    pub(crate) fn parse(pattern: &str) -> Result<Self, RouteError> {
        if pattern.is_empty() || !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }

        let bytes = pattern.as_bytes();
        let wildcard = pattern.len() > 1 && pattern.ends_with('/');
        let mut trie_path = String::with_capacity(pattern.len());
        let mut params: Vec<(Arc<str>, u16)> = Vec::new();
        let mut constraints: Vec<Option<Arc<Regex>>> = Vec::new();

        trie_path.push('/');
        let mut segment: u16 = 0;
        let mut i = 1;
        loop {
            if i >= bytes.len() {
                break;
            }
            if bytes[i] == b':' {
                let mut j = i + 1;
                while j < bytes.len() && !matches!(bytes[j], b'/' | b'<' | b':') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b':' {
                    return Err(RouteError::MisplacedParameter {
                        pattern: pattern.to_string(),
                    });
                }
                let name = &pattern[i + 1..j];
                if name.is_empty() {
                    return Err(RouteError::AnonymousParameter {
                        pattern: pattern.to_string(),
                    });
                }
                if params.iter().any(|(n, _)| n.as_ref() == name) {
                    return Err(RouteError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                let mut constraint = None;
                if j < bytes.len() && bytes[j] == b'<' {
                    let close = find_constraint_end(bytes, j + 1).ok_or_else(|| {
                        RouteError::UnterminatedConstraint {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        }
                    })?;
                    let source = &pattern[j + 1..close];
                    let re = Regex::new(&format!("^(?:{source})$")).map_err(|source| {
                        RouteError::InvalidConstraint {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                            source,
                        }
                    })?;
                    constraint = Some(Arc::new(re));
                    j = close + 1;
                }
                if j < bytes.len() && bytes[j] != b'/' {
                    return Err(RouteError::MisplacedParameter {
                        pattern: pattern.to_string(),
                    });
                }
                params.push((Arc::from(name), segment));
                constraints.push(constraint);
                trie_path.push(':');
                i = j;
            } else {
                let mut j = i;
                while j < bytes.len() && !matches!(bytes[j], b'/' | b':') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b':' {
                    return Err(RouteError::MisplacedParameter {
                        pattern: pattern.to_string(),
                    });
                }
                trie_path.push_str(&pattern[i..j]);
                i = j;
            }
            if i < bytes.len() {
                // At a '/': close this segment and open the next.
                trie_path.push('/');
                segment += 1;
                i += 1;
            } else {
                break;
            }
        }

        if wildcard {
            params.push((Arc::from("*"), segment));
        }

        Ok(Self {
            raw: pattern.to_string(),
            trie_path,
            params,
            constraints,
        })
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn params(&self) -> &[(Arc<str>, u16)] {
        &self.params
    }

    /// The bare root pattern `/` ends in a slash but is not a wildcard; the
    /// matcher needs to know so it never promotes the root node to a
    /// catch-all.
    pub(crate) fn is_bare_root(&self) -> bool {
        self.raw == "/"
    }

    /// Decompose the trie path into insertion steps.
    pub(crate) fn atoms(&self) -> Vec<Atom<'_>> {
        let mut atoms = Vec::new();
        let mut constraints = self.constraints.iter();
        let mut rest = self.trie_path.as_str();
        while let Some(pos) = rest.find(':') {
            if pos > 0 {
                atoms.push(Atom::Literal(&rest[..pos]));
            }
            atoms.push(Atom::Parameter(
                constraints.next().and_then(|c| c.as_ref()),
            ));
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            atoms.push(Atom::Literal(rest));
        }
        atoms
    }
}

/// Find the `>` closing an inline constraint: the first `>` that sits at the
/// end of the segment (followed by `/` or the end of the pattern). Scanning
/// this way lets the constraint itself contain `>`, as in `(?<y>..)`.
fn find_constraint_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut k = from;
    while k < bytes.len() {
        if bytes[k] == b'>' && (k + 1 == bytes.len() || bytes[k + 1] == b'/') {
            return Some(k);
        }
        k += 1;
    }
    None
}
