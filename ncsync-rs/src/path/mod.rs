//! Keyed path expressions.
//!
//! A small selector language for pulling nodes out of a tree:
//!
//! ```text
//! hosts/host[name='h1' and domain='lab']/enabled
//! ```
//!
//! Each step selects children of the current node set by local name, with
//! an optional predicate over child leaf values. Predicates support `=` and
//! `!=` comparisons joined by `and` and `or`. Prefixes are accepted and
//! ignored; matching is by local name since nodes carry resolved
//! namespaces.

use crate::error::{Error, Result};
use crate::node::Node;

/// A parsed path expression.
#[derive(Debug, Clone)]
pub struct Path {
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
struct Step {
    name: String,
    predicate: Option<Expr>,
}

#[derive(Debug, Clone)]
enum Expr {
    Cmp {
        child: String,
        negated: bool,
        literal: String,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn matches(&self, node: &Node) -> bool {
        match self {
            Expr::Cmp {
                child,
                negated,
                literal,
            } => match node.child(child).and_then(Node::value) {
                // A missing child never satisfies a comparison.
                None => false,
                Some(v) => (v.to_string() == *literal) != *negated,
            },
            Expr::And(l, r) => l.matches(node) && r.matches(node),
            Expr::Or(l, r) => l.matches(node) || r.matches(node),
        }
    }
}

impl Path {
    /// Parses a path expression.
    pub fn parse(input: &str) -> Result<Path> {
        let tokens = tokenize(input)?;
        Parser { tokens, pos: 0 }.parse_path()
    }

    /// Evaluates the path from `root`, returning every node the final step
    /// selects, in document order.
    pub fn eval<'t>(&self, root: &'t Node) -> Vec<&'t Node> {
        let mut frontier = vec![root];
        for step in &self.steps {
            let mut next = Vec::new();
            for node in frontier {
                if let Some(children) = node.children() {
                    for child in children {
                        if child.name() == step.name
                            && step.predicate.as_ref().is_none_or(|p| p.matches(child))
                        {
                            next.push(child);
                        }
                    }
                }
            }
            frontier = next;
        }
        frontier
    }

    /// First node the path selects, if any.
    pub fn eval_first<'t>(&self, root: &'t Node) -> Option<&'t Node> {
        self.eval(root).into_iter().next()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    LBracket,
    RBracket,
    Eq,
    Ne,
    Name(String),
    Literal(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push(Token::Ne),
                    _ => return Err(Error::Path(format!("expected '=' after '!' at {i}"))),
                }
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut lit = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => lit.push(ch),
                        None => return Err(Error::Path("unterminated string literal".into())),
                    }
                }
                tokens.push(Token::Literal(lit));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':') {
                        name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            other => return Err(Error::Path(format!("unexpected character '{other}' at {i}"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect_name(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Name(n)) => Ok(local_name(&n)),
            other => Err(Error::Path(format!("expected name, found {other:?}"))),
        }
    }

    fn parse_path(mut self) -> Result<Path> {
        // A leading slash is allowed and means the same thing.
        if self.peek() == Some(&Token::Slash) {
            self.next();
        }
        let mut steps = Vec::new();
        loop {
            let name = self.expect_name()?;
            let predicate = if self.peek() == Some(&Token::LBracket) {
                self.next();
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RBracket) => Some(expr),
                    other => {
                        return Err(Error::Path(format!("expected ']', found {other:?}")))
                    }
                }
            } else {
                None
            };
            steps.push(Step { name, predicate });

            match self.next() {
                None => break,
                Some(Token::Slash) => continue,
                other => return Err(Error::Path(format!("expected '/', found {other:?}"))),
            }
        }
        Ok(Path { steps })
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_and()?;
        while let Some(Token::Name(n)) = self.peek() {
            if n != "or" {
                break;
            }
            self.next();
            expr = Expr::Or(Box::new(expr), Box::new(self.parse_and()?));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_cmp()?;
        while let Some(Token::Name(n)) = self.peek() {
            if n != "and" {
                break;
            }
            self.next();
            expr = Expr::And(Box::new(expr), Box::new(self.parse_cmp()?));
        }
        Ok(expr)
    }

    fn parse_cmp(&mut self) -> Result<Expr> {
        let child = self.expect_name()?;
        let negated = match self.next() {
            Some(Token::Eq) => false,
            Some(Token::Ne) => true,
            other => {
                return Err(Error::Path(format!(
                    "expected '=' or '!=', found {other:?}"
                )))
            }
        };
        match self.next() {
            Some(Token::Literal(lit)) => Ok(Expr::Cmp {
                child,
                negated,
                literal: lit,
            }),
            other => Err(Error::Path(format!(
                "expected string literal, found {other:?}"
            ))),
        }
    }
}

/// Strips an optional prefix from a qualified name.
fn local_name(name: &str) -> String {
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContainerSchema, ListSchema, Value};
    use std::rc::Rc;

    const NS: &str = "urn:test";

    fn leaf(name: &str, value: &str) -> Node {
        Node::leaf(NS, name, Value::Str(value.to_string()))
    }

    fn host(name: &str, domain: &str) -> Node {
        let schema = Rc::new(ListSchema::new(
            vec!["name".into(), "domain".into(), "enabled".into()],
            2,
        ));
        Node::list_entry(NS, "host", schema)
            .with_child(leaf("name", name))
            .with_child(leaf("domain", domain))
            .with_child(Node::leaf(NS, "enabled", Value::Bool(true)))
    }

    fn tree() -> Node {
        Node::container(NS, "hosts", Rc::new(ContainerSchema::new(vec![])))
            .with_child(host("h1", "lab"))
            .with_child(host("h2", "lab"))
            .with_child(host("h3", "prod"))
    }

    #[test]
    fn test_simple_step() {
        let tree = tree();
        let path = Path::parse("host").unwrap();
        assert_eq!(path.eval(&tree).len(), 3);
    }

    #[test]
    fn test_key_predicate() {
        let tree = tree();
        let path = Path::parse("host[name='h2']/domain").unwrap();
        let found = path.eval_first(&tree).unwrap();
        assert_eq!(found.value(), Some(&Value::Str("lab".into())));
    }

    #[test]
    fn test_and_or_predicates() {
        let tree = tree();

        let path = Path::parse("host[name='h1' and domain='lab']").unwrap();
        assert_eq!(path.eval(&tree).len(), 1);

        let path = Path::parse("host[name='h1' or name='h3']").unwrap();
        assert_eq!(path.eval(&tree).len(), 2);

        let path = Path::parse("host[domain!='lab']").unwrap();
        let found = path.eval(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].child("name").unwrap().value(),
            Some(&Value::Str("h3".into()))
        );
    }

    #[test]
    fn test_leading_slash_and_prefixes() {
        let tree = tree();
        let path = Path::parse("/t:host[t:name=\"h1\"]/t:enabled").unwrap();
        let found = path.eval_first(&tree).unwrap();
        assert_eq!(found.value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_missing_child_fails_predicate() {
        let tree = tree();
        let path = Path::parse("host[bogus='x']").unwrap();
        assert!(path.eval(&tree).is_empty());
        let path = Path::parse("host[bogus!='x']").unwrap();
        assert!(path.eval(&tree).is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Path::parse("").is_err());
        assert!(Path::parse("host[name]").is_err());
        assert!(Path::parse("host[name='h1'").is_err());
        assert!(Path::parse("host[name='h1]").is_err());
        assert!(Path::parse("host/").is_err());
        assert!(Path::parse("host[name!'h1']").is_err());
    }
}
