//! Generic DOT grammar layer: tokenizes a `(di)graph` document into an
//! abstract statement list without any flow-definition semantics. The
//! semantic traversal lives in the parent module.

use crate::error::ParseError;

/// A parsed DOT document.
#[derive(Debug, Clone)]
pub struct DotGraph {
    pub directed: bool,
    pub id: Option<String>,
    pub statements: Vec<DotStatement>,
}

/// One statement from a DOT statement list.
#[derive(Debug, Clone)]
pub enum DotStatement {
    /// `A [label="..."]`
    Node {
        id: String,
        attrs: Vec<(String, String)>,
    },
    /// `A -> B -> C [label="..."]` — endpoints kept N-ary, expansion into
    /// binary edges is the semantic layer's job.
    Edge {
        endpoints: Vec<String>,
        attrs: Vec<(String, String)>,
    },
    /// Graph-level `key = value` or an entry of `graph [ ... ]`.
    Attr { name: String, value: String },
    /// `subgraph name { ... }` or an anonymous `{ ... }` block.
    Subgraph {
        id: Option<String>,
        statements: Vec<DotStatement>,
    },
}

/// Parse a DOT document. Malformed input is a hard failure.
pub fn parse_dot(source: &str) -> Result<DotGraph, ParseError> {
    let mut cursor = DotCursor::new(source);
    cursor.parse_graph()
}

/// Stateful character cursor over DOT source.
struct DotCursor {
    src: Vec<char>,
    pos: usize,
}

impl DotCursor {
    fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek(&self, s: &str) -> bool {
        let chars: Vec<char> = s.chars().collect();
        if self.pos + chars.len() > self.src.len() {
            return false;
        }
        self.src[self.pos..self.pos + chars.len()] == chars[..]
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// True when `word` is present as a whole keyword, not an identifier
    /// prefix (`subgraph` must not match `subgraphX`).
    fn peek_keyword(&self, word: &str) -> bool {
        if !self.peek(word) {
            return false;
        }
        match self.src.get(self.pos + word.chars().count()) {
            Some(ch) => !ch.is_ascii_alphanumeric() && *ch != '_',
            None => true,
        }
    }

    fn consume_keyword(&mut self, word: &str) -> bool {
        if self.peek_keyword(word) {
            self.pos += word.chars().count();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and all three DOT comment styles.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek("//") => {
                    while !self.eof() && self.src[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek("/*") => {
                    self.pos += 2;
                    while !self.eof() && !self.peek("*/") {
                        self.pos += 1;
                    }
                    self.consume("*/");
                }
                Some('#') => {
                    while !self.eof() && self.src[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn line(&self) -> usize {
        self.src[..self.pos.min(self.src.len())]
            .iter()
            .filter(|c| **c == '\n')
            .count()
            + 1
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            format: "dot",
            line: self.line(),
            message: message.into(),
        }
    }

    /// An identifier: bare word, number, or double-quoted string.
    fn parse_id(&mut self) -> Option<String> {
        self.skip_trivia();
        let ch = self.peek_char()?;
        if ch == '"' {
            return Some(self.parse_quoted());
        }
        if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
            return None;
        }
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(self.src[start..self.pos].iter().collect())
    }

    fn parse_quoted(&mut self) -> String {
        // caller verified a leading quote
        self.pos += 1;
        let mut buf = String::new();
        while let Some(ch) = self.peek_char() {
            match ch {
                '"' => {
                    self.pos += 1;
                    break;
                }
                '\\' if self.pos + 1 < self.src.len() => {
                    let next = self.src[self.pos + 1];
                    match next {
                        'n' => buf.push('\n'),
                        '"' => buf.push('"'),
                        '\\' => buf.push('\\'),
                        'l' | 'r' => buf.push('\n'),
                        other => {
                            buf.push('\\');
                            buf.push(other);
                        }
                    }
                    self.pos += 2;
                }
                _ => {
                    buf.push(ch);
                    self.pos += 1;
                }
            }
        }
        buf
    }

    /// `[ key = value, ... ]`, possibly repeated (`[a=1][b=2]`).
    fn parse_attr_list(&mut self) -> Result<Vec<(String, String)>, ParseError> {
        let mut attrs = Vec::new();
        loop {
            self.skip_trivia();
            if !self.consume("[") {
                break;
            }
            loop {
                self.skip_trivia();
                if self.consume("]") {
                    break;
                }
                let Some(key) = self.parse_id() else {
                    return Err(self.error("expected attribute name or ']'"));
                };
                self.skip_trivia();
                let value = if self.consume("=") {
                    self.parse_id()
                        .ok_or_else(|| self.error(format!("expected value for attribute '{}'", key)))?
                } else {
                    String::new()
                };
                attrs.push((key, value));
                self.skip_trivia();
                let _ = self.consume(",") || self.consume(";");
            }
        }
        Ok(attrs)
    }

    fn parse_graph(&mut self) -> Result<DotGraph, ParseError> {
        self.skip_trivia();
        self.consume_keyword("strict");
        self.skip_trivia();

        let directed = if self.consume_keyword("digraph") {
            true
        } else if self.consume_keyword("graph") {
            false
        } else {
            return Err(self.error("expected 'graph' or 'digraph'"));
        };

        self.skip_trivia();
        let id = if self.peek("{") { None } else { self.parse_id() };

        self.skip_trivia();
        if !self.consume("{") {
            return Err(self.error("expected '{' after graph header"));
        }

        let statements = self.parse_statement_list()?;

        self.skip_trivia();
        if !self.eof() {
            return Err(self.error("unexpected trailing input after graph body"));
        }

        Ok(DotGraph {
            directed,
            id,
            statements,
        })
    }

    /// Statements up to and including the closing `}`.
    fn parse_statement_list(&mut self) -> Result<Vec<DotStatement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_trivia();
            if self.consume("}") {
                return Ok(statements);
            }
            if self.eof() {
                return Err(self.error("unexpected end of input, expected '}'"));
            }
            if self.consume(";") {
                continue;
            }
            // `graph [..]` feeds graph-level attrs; `node [..]` / `edge [..]`
            // default-attr statements are recognized and dropped.
            if self.consume_keyword("graph") {
                self.skip_trivia();
                if !self.peek("[") {
                    return Err(self.error("expected '[' after 'graph'"));
                }
                for (name, value) in self.parse_attr_list()? {
                    statements.push(DotStatement::Attr { name, value });
                }
                continue;
            }
            if self.consume_keyword("node") || self.consume_keyword("edge") {
                self.skip_trivia();
                if !self.peek("[") {
                    return Err(self.error("expected '[' in default attribute statement"));
                }
                let _ = self.parse_attr_list()?;
                continue;
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<DotStatement, ParseError> {
        self.skip_trivia();

        // Anonymous or named subgraph.
        if self.peek("{") || self.peek_keyword("subgraph") {
            let id = if self.consume_keyword("subgraph") {
                self.skip_trivia();
                if self.peek("{") { None } else { self.parse_id() }
            } else {
                None
            };
            self.skip_trivia();
            if !self.consume("{") {
                return Err(self.error("expected '{' after 'subgraph'"));
            }
            let statements = self.parse_statement_list()?;
            return Ok(DotStatement::Subgraph { id, statements });
        }

        let Some(first) = self.parse_id() else {
            return Err(self.error("expected a statement"));
        };

        self.skip_trivia();

        // Graph-level `key = value`.
        if self.consume("=") {
            let value = self
                .parse_id()
                .ok_or_else(|| self.error(format!("expected value after '{} ='", first)))?;
            return Ok(DotStatement::Attr { name: first, value });
        }

        // Edge chain: `A -> B -> C` (directed) or `A -- B` (undirected).
        let mut endpoints = vec![first];
        loop {
            self.skip_trivia();
            if self.consume("->") || self.consume("--") {
                let Some(next) = self.parse_id() else {
                    return Err(self.error("expected node id after edge operator"));
                };
                endpoints.push(next);
            } else {
                break;
            }
        }

        let attrs = self.parse_attr_list()?;
        if endpoints.len() > 1 {
            Ok(DotStatement::Edge { endpoints, attrs })
        } else {
            Ok(DotStatement::Node {
                id: endpoints.remove(0),
                attrs,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_digraph() {
        let g = parse_dot("digraph { A -> B }").unwrap();
        assert!(g.directed);
        assert_eq!(g.statements.len(), 1);
        match &g.statements[0] {
            DotStatement::Edge { endpoints, .. } => {
                assert_eq!(endpoints, &["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected edge statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_named_graph() {
        let g = parse_dot("digraph G { }").unwrap();
        assert_eq!(g.id.as_deref(), Some("G"));
    }

    #[test]
    fn test_parse_node_attrs() {
        let g = parse_dot("digraph { A [label=\"Start here\", shape=box]; }").unwrap();
        match &g.statements[0] {
            DotStatement::Node { id, attrs } => {
                assert_eq!(id, "A");
                assert_eq!(attrs[0], ("label".to_string(), "Start here".to_string()));
                assert_eq!(attrs[1].0, "shape");
            }
            other => panic!("expected node statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_edge_chain_with_label() {
        let g = parse_dot("digraph { A -> B -> C [label=\"next\"] }").unwrap();
        match &g.statements[0] {
            DotStatement::Edge { endpoints, attrs } => {
                assert_eq!(endpoints.len(), 3);
                assert_eq!(attrs[0].1, "next");
            }
            other => panic!("expected edge statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_subgraph() {
        let g = parse_dot("digraph { subgraph cluster_a { X -> Y } }").unwrap();
        match &g.statements[0] {
            DotStatement::Subgraph { id, statements } => {
                assert_eq!(id.as_deref(), Some("cluster_a"));
                assert_eq!(statements.len(), 1);
            }
            other => panic!("expected subgraph, got {:?}", other),
        }
    }

    #[test]
    fn test_subgraph_prefixed_identifier_is_a_node() {
        let g = parse_dot("digraph { subgraphX -> B }").unwrap();
        match &g.statements[0] {
            DotStatement::Edge { endpoints, .. } => {
                assert_eq!(endpoints, &["subgraphX".to_string(), "B".to_string()]);
            }
            other => panic!("expected edge statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_comments() {
        let src = "digraph {\n// line\n/* block */\n# hash\nA -> B\n}";
        let g = parse_dot(src).unwrap();
        assert_eq!(g.statements.len(), 1);
    }

    #[test]
    fn test_graph_attr_statements() {
        let g = parse_dot("digraph { graph [label=\"My Flow\"]; label=\"Override\"; A }").unwrap();
        let attrs: Vec<_> = g
            .statements
            .iter()
            .filter(|s| matches!(s, DotStatement::Attr { .. }))
            .collect();
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_node_edge_defaults_dropped() {
        let g = parse_dot("digraph { node [shape=box]; edge [color=red]; A -> B }").unwrap();
        assert_eq!(g.statements.len(), 1);
    }

    #[test]
    fn test_dangling_edge_is_error() {
        let err = parse_dot("digraph { A -> }").unwrap_err();
        assert!(err.to_string().contains("edge operator"));
    }

    #[test]
    fn test_missing_close_brace_is_error() {
        assert!(parse_dot("digraph { A -> B").is_err());
    }

    #[test]
    fn test_not_dot_at_all() {
        assert!(parse_dot("flowchart TD\nA --> B").is_err());
    }

    #[test]
    fn test_quoted_ids_and_escapes() {
        let g = parse_dot("digraph { \"node one\" [label=\"line1\\nline2\"] }").unwrap();
        match &g.statements[0] {
            DotStatement::Node { id, attrs } => {
                assert_eq!(id, "node one");
                assert_eq!(attrs[0].1, "line1\nline2");
            }
            other => panic!("expected node statement, got {:?}", other),
        }
    }
}
