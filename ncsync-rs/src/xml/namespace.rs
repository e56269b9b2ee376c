//! Namespace resolution during parsing.

use std::collections::HashMap;
use std::rc::Rc;

/// Tracks prefix bindings while walking a document.
///
/// URIs are interned as `Rc<str>` so every node in a tree shares one
/// allocation per distinct namespace.
pub struct NamespaceContext {
    uri_cache: HashMap<String, Rc<str>>,
    scopes: Vec<HashMap<String, Rc<str>>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            uri_cache: HashMap::new(),
            scopes: vec![HashMap::new()],
        };
        ctx.bind("xml", "http://www.w3.org/XML/1998/namespace");
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope. The empty prefix is
    /// the default namespace.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        let uri_rc = self.intern(uri);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri_rc);
        }
    }

    /// Resolves a prefix, innermost scope first.
    pub fn resolve(&self, prefix: &str) -> Option<Rc<str>> {
        for scope in self.scopes.iter().rev() {
            if let Some(uri) = scope.get(prefix) {
                return Some(uri.clone());
            }
        }
        None
    }

    /// The default namespace in scope, or the empty URI.
    pub fn default_namespace(&self) -> Rc<str> {
        self.resolve("").unwrap_or_else(|| self.no_namespace())
    }

    /// The interned empty URI.
    pub fn no_namespace(&self) -> Rc<str> {
        // Not interned through the cache to keep this &self.
        Rc::from("")
    }

    fn intern(&mut self, uri: &str) -> Rc<str> {
        if let Some(cached) = self.uri_cache.get(uri) {
            cached.clone()
        } else {
            let rc: Rc<str> = uri.into();
            self.uri_cache.insert(uri.to_string(), rc.clone());
            rc
        }
    }
}

/// Splits a qualified name into optional prefix and local name.
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.find(':') {
        Some(pos) => (Some(&qname[..pos]), &qname[pos + 1..]),
        None => (None, qname),
    }
}

/// True for `xmlns` and `xmlns:prefix` attributes.
pub fn is_xmlns_attr(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NETCONF_NAMESPACE;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("nc:operation"), (Some("nc"), "operation"));
        assert_eq!(split_qname("host"), (None, "host"));
    }

    #[test]
    fn test_scoped_bindings() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("nc", NETCONF_NAMESPACE);

        ctx.push_scope();
        ctx.bind("", "urn:example:hosts");
        assert_eq!(ctx.resolve("nc").unwrap().as_ref(), NETCONF_NAMESPACE);
        assert_eq!(ctx.default_namespace().as_ref(), "urn:example:hosts");

        ctx.pop_scope();
        assert_eq!(ctx.default_namespace().as_ref(), "");
        assert!(ctx.resolve("nc").is_some());

        ctx.pop_scope();
        assert!(ctx.resolve("nc").is_none());
    }

    #[test]
    fn test_interning_shares_uris() {
        let mut ctx = NamespaceContext::new();
        ctx.bind("a", "urn:example:hosts");
        ctx.bind("b", "urn:example:hosts");
        assert!(std::rc::Rc::ptr_eq(
            &ctx.resolve("a").unwrap(),
            &ctx.resolve("b").unwrap()
        ));
    }

    #[test]
    fn test_xmlns_detection() {
        assert!(is_xmlns_attr("xmlns"));
        assert!(is_xmlns_attr("xmlns:nc"));
        assert!(!is_xmlns_attr("xml:lang"));
        assert!(!is_xmlns_attr("operation"));
    }
}
