//! Structural CSS parser.
//!
//! Splits a stylesheet into rules, at-rules, declarations and comments
//! without interpreting property values. That is all the expansion stage
//! needs to find its directives; real syntax checking happens later in the
//! post-processing stage.

use stylebuild_shared::{Result, StyleBuildError};

/// A node of the stylesheet tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `selector { body }`
    Rule { selector: String, body: Vec<Node> },
    /// `@name prelude;` or `@name prelude { block }`
    AtRule {
        name: String,
        prelude: String,
        block: Option<Vec<Node>>,
    },
    /// `property: value` (without the trailing semicolon).
    Declaration(String),
    /// A full `/* ... */` comment.
    Comment(String),
}

enum Terminator {
    Block,
    Semicolon,
    Close,
    End,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

/// Parse a stylesheet into a node tree.
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
    };
    parser.parse_nodes(None)
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Parse nodes until the matching `}` (when `open_line` is set) or EOF.
    fn parse_nodes(&mut self, open_line: Option<usize>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return match open_line {
                        Some(line) => Err(StyleBuildError::parse(format!(
                            "unclosed block opened on line {line}"
                        ))),
                        None => Ok(nodes),
                    };
                }
                Some('}') => {
                    if open_line.is_none() {
                        return Err(StyleBuildError::parse(format!(
                            "unexpected `}}` on line {}",
                            self.line
                        )));
                    }
                    self.advance();
                    return Ok(nodes);
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let mut comment = String::new();
                    self.read_comment(&mut comment)?;
                    nodes.push(Node::Comment(comment));
                }
                Some(_) => {
                    let start_line = self.line;
                    let (text, terminator) = self.read_prelude()?;
                    let text = text.trim().to_string();

                    match terminator {
                        Terminator::Block => {
                            self.advance();
                            if text.is_empty() {
                                return Err(StyleBuildError::parse(format!(
                                    "block without a selector on line {start_line}"
                                )));
                            }
                            let body = self.parse_nodes(Some(start_line))?;
                            nodes.push(block_node(text, body));
                        }
                        Terminator::Semicolon => {
                            self.advance();
                            if !text.is_empty() {
                                nodes.push(statement_node(text));
                            }
                        }
                        Terminator::Close | Terminator::End => {
                            if !text.is_empty() {
                                nodes.push(statement_node(text));
                            }
                        }
                    }
                }
            }
        }
    }

    /// Read up to the next top-level `;`, `{`, `}` or EOF. The terminator is
    /// left unconsumed.
    fn read_prelude(&mut self) -> Result<(String, Terminator)> {
        let mut text = String::new();
        let mut depth = 0usize;

        while let Some(c) = self.peek() {
            match c {
                '"' | '\'' => self.read_string(c, &mut text)?,
                '/' if self.peek_at(1) == Some('*') => self.read_comment(&mut text)?,
                '(' | '[' => {
                    depth += 1;
                    text.push(c);
                    self.advance();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    text.push(c);
                    self.advance();
                }
                '{' if depth == 0 => return Ok((text, Terminator::Block)),
                ';' if depth == 0 => return Ok((text, Terminator::Semicolon)),
                '}' if depth == 0 => return Ok((text, Terminator::Close)),
                _ => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        Ok((text, Terminator::End))
    }

    fn read_string(&mut self, quote: char, out: &mut String) -> Result<()> {
        let start_line = self.line;
        out.push(quote);
        self.advance();

        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(StyleBuildError::parse(format!(
                        "unterminated string on line {start_line}"
                    )));
                }
                Some('\\') => {
                    out.push('\\');
                    if let Some(escaped) = self.advance() {
                        out.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    out.push(c);
                    return Ok(());
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_comment(&mut self, out: &mut String) -> Result<()> {
        let start_line = self.line;
        // opening `/*`
        out.push('/');
        out.push('*');
        self.advance();
        self.advance();

        loop {
            match self.advance() {
                None => {
                    return Err(StyleBuildError::parse(format!(
                        "unterminated comment opened on line {start_line}"
                    )));
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    out.push_str("*/");
                    return Ok(());
                }
                Some(c) => out.push(c),
            }
        }
    }
}

fn split_at_rule(text: &str) -> (String, String) {
    let rest = &text[1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '(' || c == '"' || c == '\'')
        .unwrap_or(rest.len());
    (rest[..end].to_string(), rest[end..].trim().to_string())
}

fn block_node(text: String, body: Vec<Node>) -> Node {
    if text.starts_with('@') {
        let (name, prelude) = split_at_rule(&text);
        Node::AtRule {
            name,
            prelude,
            block: Some(body),
        }
    } else {
        Node::Rule {
            selector: text,
            body,
        }
    }
}

fn statement_node(text: String) -> Node {
    if text.starts_with('@') {
        let (name, prelude) = split_at_rule(&text);
        Node::AtRule {
            name,
            prelude,
            block: None,
        }
    } else {
        Node::Declaration(text)
    }
}

// ---------------------------------------------------------------------------
// Printer
// ---------------------------------------------------------------------------

/// Render a node tree back to CSS text.
pub fn print(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes, 0);
    out
}

fn write_nodes(out: &mut String, nodes: &[Node], depth: usize) {
    let indent = "  ".repeat(depth);

    for node in nodes {
        match node {
            Node::Comment(text) => {
                out.push_str(&indent);
                out.push_str(text);
                out.push('\n');
            }
            Node::Declaration(text) => {
                out.push_str(&format!("{indent}{text};\n"));
            }
            Node::Rule { selector, body } => {
                out.push_str(&format!("{indent}{selector} {{\n"));
                write_nodes(out, body, depth + 1);
                out.push_str(&format!("{indent}}}\n"));
            }
            Node::AtRule {
                name,
                prelude,
                block,
            } => {
                let head = if prelude.is_empty() {
                    format!("@{name}")
                } else {
                    format!("@{name} {prelude}")
                };
                match block {
                    None => out.push_str(&format!("{indent}{head};\n")),
                    Some(body) => {
                        out.push_str(&format!("{indent}{head} {{\n"));
                        write_nodes(out, body, depth + 1);
                        out.push_str(&format!("{indent}}}\n"));
                    }
                }
            }
        }
    }
}
