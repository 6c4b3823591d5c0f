//! The route tree.
//!
//! One node per path segment. A node keeps its static children in a list and
//! at most one dynamic (typed capture) child in a separate slot:
//!
//! ```text
//! /                       root
//! ├── users               static
//! │   ├── me              static     ← wins over {id uint} for "me"
//! │   └── {id uint}       dynamic    ← the only dynamic child of "users"
//! │       └── posts       static
//! └── files               static
//!     └── {rest path}     dynamic    ← must be last, swallows the remainder
//! ```
//!
//! Lookup is a single walk from the root: O(depth), no backtracking. At each
//! level a static child whose name equals the segment is taken; only if none
//! does the dynamic child get a chance. Two different dynamic children can
//! never share a level, so there is never more than one candidate to try.

use http::Method;

use crate::error::RouteError;
use crate::norm::clean_path;
use crate::params::{Params, ParamsBuilder, Value};
use crate::pattern::{self, Kind, Segment};

struct Node<T> {
    segment: Segment,
    statics: Vec<Node<T>>,
    dynamic: Option<Box<Node<T>>>,
    /// Registration order is kept so `Allow` headers are stable.
    handlers: Vec<(Method, T)>,
    route: Option<String>,
}

impl<T> Node<T> {
    fn new(segment: Segment) -> Self {
        Self {
            segment,
            statics: Vec::new(),
            dynamic: None,
            handlers: Vec::new(),
            route: None,
        }
    }

    fn static_child(&self, name: &str) -> Option<&Node<T>> {
        self.statics.iter().find(|c| c.segment.name == name)
    }
}

/// A route tree mapping `(method, path)` to values of type `T`.
///
/// Built once with [`insert`](Tree::insert), then queried concurrently with
/// [`at`](Tree::at). `T` is a handler in the router; tests use plain values.
pub struct Tree<T> {
    root: Node<T>,
}

/// The outcome of a successful walk.
pub struct Match<'t, T> {
    node: &'t Node<T>,
    params: Params,
}

impl<'t, T> Match<'t, T> {
    /// The value registered for `method` at the matched node.
    pub fn value(&self, method: &Method) -> Option<&'t T> {
        self.node.handlers.iter().find(|(m, _)| m == method).map(|(_, v)| v)
    }

    /// Every method registered at the matched node, in registration order.
    pub fn methods(&self) -> Vec<Method> {
        self.node.handlers.iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn has_methods(&self) -> bool {
        !self.node.handlers.is_empty()
    }

    /// The pattern registered for the matched node. `None` only for an empty
    /// root.
    pub fn route(&self) -> Option<&'t str> {
        self.node.route.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            root: Node::new(Segment { name: "/".to_owned(), kind: Kind::Static }),
        }
    }

    /// Registers `value` for `method` at `pattern`.
    ///
    /// The pattern is fully validated before the tree is touched. After that
    /// the only failures are conflicts with existing nodes, which are found
    /// before any node at or below the conflicting level is created, so a
    /// failed insert never leaves a dynamic child or handler behind.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        if pattern.is_empty() {
            return Err(RouteError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(RouteError::NotRooted(pattern.to_owned()));
        }
        if clean_path(pattern) != pattern {
            return Err(RouteError::Unclean(pattern.to_owned()));
        }
        let segments = pattern::segments(pattern)?;

        let mut node = &mut self.root;
        for segment in segments {
            node = if segment.kind.is_static() {
                descend_static(node, segment)
            } else {
                descend_dynamic(node, segment, pattern)?
            };
        }

        if node.handlers.iter().any(|(m, _)| *m == method) {
            return Err(RouteError::AlreadyRegistered { method, route: pattern.to_owned() });
        }
        node.handlers.push((method, value));
        if node.route.is_none() {
            node.route = Some(pattern.to_owned());
        }
        Ok(())
    }

    /// Walks `path` (without its leading `/`) down the tree.
    ///
    /// The root always matches the empty path so `OPTIONS /` can be answered
    /// on an empty router. Any other node matches only if it carries at least
    /// one handler.
    pub fn at(&self, path: &str) -> Option<Match<'_, T>> {
        let mut params = ParamsBuilder::default();
        let mut node = &self.root;
        let mut rest = path;
        let mut offset = 0;

        while !rest.is_empty() {
            let (part, remain) = pattern::next_part(rest);

            if let Some(child) = node.static_child(part) {
                node = child;
                rest = remain;
                offset += 1;
                continue;
            }

            let child = node.dynamic.as_deref()?;
            // An empty segment (`a//b`) never satisfies a single-segment capture.
            if part.is_empty() && child.segment.kind != Kind::Path {
                return None;
            }
            let raw = match child.segment.kind {
                Kind::Path => {
                    let all = rest;
                    rest = "";
                    all
                }
                _ => {
                    rest = remain;
                    part
                }
            };
            let value = Value::coerce(child.segment.kind, raw)?;
            if !child.segment.is_anonymous() {
                params.push(&child.segment.name, child.segment.kind, raw, offset, value);
            }
            node = child;
            offset += 1;
        }

        if node.handlers.is_empty() && !std::ptr::eq(node, &self.root) {
            return None;
        }
        Some(Match { node, params: params.finish() })
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self { Self::new() }
}

fn descend_static<T>(node: &mut Node<T>, segment: Segment) -> &mut Node<T> {
    let idx = match node.statics.iter().position(|c| c.segment.name == segment.name) {
        Some(idx) => idx,
        None => {
            node.statics.push(Node::new(segment));
            node.statics.len() - 1
        }
    };
    &mut node.statics[idx]
}

fn descend_dynamic<'n, T>(
    node: &'n mut Node<T>,
    segment: Segment,
    pattern: &str,
) -> Result<&'n mut Node<T>, RouteError> {
    if let Some(existing) = &node.dynamic {
        if existing.segment != segment {
            return Err(RouteError::Conflict {
                route: pattern.to_owned(),
                name: segment.name,
                kind: segment.kind,
                existing_name: existing.segment.name.clone(),
                existing_kind: existing.segment.kind,
            });
        }
    }
    let child = node.dynamic.get_or_insert_with(|| Box::new(Node::new(segment)));
    Ok(&mut **child)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tree(routes: &[(&str, u32)]) -> Tree<u32> {
        let mut tree = Tree::new();
        for (pattern, value) in routes {
            tree.insert(Method::GET, pattern, *value).unwrap();
        }
        tree
    }

    fn get(tree: &Tree<u32>, path: &str) -> Option<u32> {
        tree.at(path.trim_start_matches('/'))?.value(&Method::GET).copied()
    }

    #[test]
    fn rejects_malformed_patterns() {
        let mut t = Tree::new();
        assert_eq!(t.insert(Method::GET, "", 0), Err(RouteError::Empty));
        assert_eq!(
            t.insert(Method::GET, "user/{uid int}", 0),
            Err(RouteError::NotRooted("user/{uid int}".to_owned())),
        );
        for unclean in ["//a", "/a/../b", "/./a", "/a//b"] {
            assert_eq!(
                t.insert(Method::GET, unclean, 0),
                Err(RouteError::Unclean(unclean.to_owned())),
            );
        }
        assert_eq!(
            t.insert(Method::GET, "/{badtyp x}", 0),
            Err(RouteError::InvalidType("x".to_owned())),
        );
        assert_eq!(
            t.insert(Method::GET, "/{path}/user", 0),
            Err(RouteError::WildcardNotLast("/{path}/user".to_owned())),
        );
    }

    #[test]
    fn rejects_duplicates() {
        let mut t = tree(&[("/", 0), ("/user", 1), ("/{uint}", 2)]);
        for pattern in ["/", "/user", "/{uint}"] {
            assert_eq!(
                t.insert(Method::GET, pattern, 9),
                Err(RouteError::AlreadyRegistered {
                    method: Method::GET,
                    route: pattern.to_owned(),
                }),
            );
        }
        // Another method on the same node is fine.
        t.insert(Method::POST, "/user", 3).unwrap();
    }

    #[test]
    fn rejects_conflicting_dynamic_children() {
        let mut t = tree(&[("/{int}", 0)]);
        assert!(matches!(
            t.insert(Method::GET, "/{string}", 1),
            Err(RouteError::Conflict { kind: Kind::String, existing_kind: Kind::Int, .. }),
        ));

        let mut t = tree(&[("/user/{a int}/new", 0)]);
        assert!(matches!(
            t.insert(Method::GET, "/user/{b int}/edit", 1),
            Err(RouteError::Conflict { .. }),
        ));

        let mut t = tree(&[("/bad/{}", 0)]);
        assert!(matches!(
            t.insert(Method::GET, "/bad/{path}", 1),
            Err(RouteError::Conflict { .. }),
        ));
    }

    #[test]
    fn conflict_leaves_tree_unchanged() {
        let mut t = tree(&[("/a/{x int}", 1)]);
        assert!(t.insert(Method::GET, "/a/{y int}/b", 2).is_err());
        assert_eq!(get(&t, "/a/5"), Some(1));
        assert_eq!(get(&t, "/a/5/b"), None);
    }

    #[test]
    fn static_wins_over_dynamic() {
        let t = tree(&[("/user/me/edit", 1), ("/user/{string}/edit", 2), ("/user/{string}/new", 3)]);
        assert_eq!(get(&t, "/user/me/edit"), Some(1));
        assert_eq!(get(&t, "/user/you/edit"), Some(2));
        assert_eq!(get(&t, "/user/you/new"), Some(3));
        // "me" commits to the static branch; no backtracking to {string}.
        assert_eq!(get(&t, "/user/me/new"), None);
    }

    #[test]
    fn static_wins_regardless_of_registration_order() {
        let t = tree(&[("/{name}", 1), ("/user", 2)]);
        assert_eq!(get(&t, "/user"), Some(2));
        assert_eq!(get(&t, "/other"), Some(1));
    }

    #[test]
    fn typed_captures() {
        let t = tree(&[("/{int}", 5)]);
        assert_eq!(get(&t, "/1"), Some(5));
        assert_eq!(get(&t, "/-1"), Some(5));
        assert_eq!(get(&t, "/nope"), None);

        let t = tree(&[("/{u uint}", 5)]);
        assert_eq!(get(&t, "/1"), Some(5));
        assert_eq!(get(&t, "/-1"), None);
        assert_eq!(get(&t, "/nope"), None);

        let t = tree(&[("/{bad float}", 5)]);
        assert_eq!(get(&t, "/1.5"), Some(5));
        assert_eq!(get(&t, "/notfloat"), None);
    }

    #[test]
    fn captures_values() {
        let t = tree(&[("/user/{account uint}/{user int}/{name string}/{f float}", 1)]);
        let m = t.at("user/123/-11/me/1.123").unwrap();
        let p = m.params();
        assert_eq!(p.get("account").unwrap().value(), &Value::Uint(123));
        assert_eq!(p.get("user").unwrap().value(), &Value::Int(-11));
        assert_eq!(p.get("name").unwrap().value(), &Value::Str("me".to_owned()));
        assert_eq!(p.get("f").unwrap().value(), &Value::Float(1.123));
        assert_eq!(p.get("user").unwrap().raw(), "-11");
        assert_eq!(m.route(), Some("/user/{account uint}/{user int}/{name string}/{f float}"));
    }

    #[test]
    fn anonymous_captures_are_not_stored() {
        let t = tree(&[("/{}/{int}", 1)]);
        let m = t.at("b/7").unwrap();
        assert!(m.params().is_empty());
    }

    #[test]
    fn wildcard_swallows_the_remainder() {
        let t = tree(&[("/files/{p path}", 1)]);
        let m = t.at("files/a/b/c").unwrap();
        assert_eq!(m.params().get("p").unwrap().raw(), "a/b/c");
        assert_eq!(m.params().get("p").unwrap().kind(), Kind::Path);

        let mut t = Tree::new();
        assert!(t.insert(Method::GET, "/files/{p path}/end", 1).is_err());
    }

    #[test]
    fn empty_segments_only_satisfy_wildcards() {
        let t = tree(&[("/a/{x}/b", 1), ("/files/{p path}", 2)]);
        assert_eq!(get(&t, "/a/x/b"), Some(1));
        assert!(t.at("a//b").is_none());

        let m = t.at("files//x").unwrap();
        assert_eq!(m.params().get("p").unwrap().raw(), "/x");
        assert_eq!(m.params().get("p").unwrap().offset(), 1);
    }

    #[test]
    fn intermediate_nodes_do_not_match() {
        let t = tree(&[("/good/one", 1), ("/good/two", 2)]);
        assert_eq!(get(&t, "/good"), None);
        assert!(t.at("good").is_none());
        assert_eq!(get(&t, "/good/one"), Some(1));
        assert_eq!(get(&t, "/good/two"), Some(2));
    }

    #[test]
    fn prefixes_registered_in_either_order() {
        for routes in [[("/a/b", 1), ("/a", 2)], [("/a", 2), ("/a/b", 1)]] {
            let t = tree(&routes);
            assert_eq!(get(&t, "/a"), Some(2));
            assert_eq!(get(&t, "/a/b"), Some(1));
            assert_eq!(get(&t, "/a/c"), None);
        }
    }

    #[test]
    fn root_always_matches() {
        let t: Tree<u32> = Tree::new();
        let m = t.at("").unwrap();
        assert!(!m.has_methods());
        assert_eq!(m.route(), None);

        let t = tree(&[("/", 7)]);
        assert_eq!(get(&t, "/"), Some(7));
    }

    #[test]
    fn trailing_slash_is_not_a_segment() {
        let t = tree(&[("/{}/", 1)]);
        assert_eq!(get(&t, "/test/"), Some(1));
        assert_eq!(get(&t, "/test"), Some(1));
        assert_eq!(t.at("test").unwrap().route(), Some("/{}/"));
    }

    #[test]
    fn methods_in_registration_order() {
        let mut t = Tree::new();
        t.insert(Method::GET, "/", 1).unwrap();
        t.insert(Method::POST, "/", 2).unwrap();
        t.insert(Method::PUT, "/test", 3).unwrap();
        let m = t.at("").unwrap();
        assert_eq!(m.methods(), vec![Method::GET, Method::POST]);
        assert_eq!(m.value(&Method::POST), Some(&2));
        assert_eq!(m.value(&Method::PUT), None);
    }
}
