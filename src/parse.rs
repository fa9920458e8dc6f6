//! Document parsing seam.
//!
//! `load` hands a fetched document to a [`DocParser`], which must produce
//! every statement before the store mutates anything. The built-in
//! implementation reads N-Triples; other formats plug in at the trait.

use crate::error::{Result, StoreError};

/// A parsed RDF term, prior to interning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Named resource.
    Uri(String),
    /// Blank node with its document-scoped label.
    Blank(String),
    /// Literal with optional datatype URI and language tag.
    Literal {
        /// Unescaped lexical form.
        lexical: String,
        /// Datatype URI, when typed.
        datatype: Option<String>,
        /// Language tag, when tagged.
        lang: Option<String>,
    },
}

/// One parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Subject term (URI or blank).
    pub subject: Term,
    /// Predicate term (URI).
    pub predicate: Term,
    /// Object term (any kind).
    pub object: Term,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDoc {
    /// Statements in document order.
    pub statements: Vec<Statement>,
    /// Prefix declarations the document carries, if the format has them.
    pub prefixes: Vec<(String, String)>,
}

/// Turns fetched bytes into statements. Implementations must not touch
/// the store; a parse failure has to leave no trace.
pub trait DocParser: Send + Sync {
    /// Parses a whole document. `base_uri` names the document itself.
    fn parse(&self, base_uri: &str, body: &[u8]) -> Result<ParsedDoc>;
}

/// Line-oriented N-Triples parser.
///
/// Accepts comments, blank lines, IRIs, blank-node labels, and literals
/// with `\` escapes, `^^<datatype>`, and `@lang` suffixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NTriplesParser;

impl DocParser for NTriplesParser {
    fn parse(&self, _base_uri: &str, body: &[u8]) -> Result<ParsedDoc> {
        let text = std::str::from_utf8(body).map_err(|e| StoreError::Parse {
            line: 0,
            reason: format!("document is not UTF-8: {e}"),
        })?;
        let mut doc = ParsedDoc::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            doc.statements.push(parse_line(trimmed, line)?);
        }
        Ok(doc)
    }
}

struct Scanner<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self { rest: text, line }
    }

    fn error(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Parse {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, prefix: char) -> bool {
        if let Some(rest) = self.rest.strip_prefix(prefix) {
            self.rest = rest;
            true
        } else {
            false
        }
    }

    /// Consumes up to (not including) `stop`, failing at end of line.
    fn until(&mut self, stop: char) -> Result<&'a str> {
        match self.rest.find(stop) {
            Some(pos) => {
                let taken = &self.rest[..pos];
                self.rest = &self.rest[pos + stop.len_utf8()..];
                Ok(taken)
            }
            None => Err(self.error(format!("unterminated token, expected '{stop}'"))),
        }
    }

    fn iri(&mut self) -> Result<String> {
        let body = self.until('>')?;
        if body.is_empty() {
            return Err(self.error("empty IRI"));
        }
        Ok(body.to_owned())
    }

    fn blank_label(&mut self) -> Result<String> {
        if !self.eat(':') {
            return Err(self.error("expected ':' after '_'"));
        }
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || c == '.')
            .unwrap_or(self.rest.len());
        let label = &self.rest[..end];
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        self.rest = &self.rest[end..];
        Ok(label.to_owned())
    }

    fn quoted(&mut self) -> Result<String> {
        let mut out = String::new();
        let mut chars = self.rest.char_indices();
        loop {
            let (pos, c) = chars
                .next()
                .ok_or_else(|| self.error("unterminated literal"))?;
            match c {
                '"' => {
                    self.rest = &self.rest[pos + 1..];
                    return Ok(out);
                }
                '\\' => {
                    let (_, esc) = chars
                        .next()
                        .ok_or_else(|| self.error("dangling escape in literal"))?;
                    match esc {
                        't' => out.push('\t'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'u' | 'U' => {
                            let len = if esc == 'u' { 4 } else { 8 };
                            let mut hex = String::with_capacity(len);
                            for _ in 0..len {
                                let (_, h) = chars
                                    .next()
                                    .ok_or_else(|| self.error("truncated \\u escape"))?;
                                hex.push(h);
                            }
                            let code = u32::from_str_radix(&hex, 16)
                                .map_err(|_| self.error("bad hex in \\u escape"))?;
                            let ch = char::from_u32(code)
                                .ok_or_else(|| self.error("\\u escape is not a character"))?;
                            out.push(ch);
                        }
                        other => {
                            return Err(self.error(format!("unknown escape '\\{other}'")))
                        }
                    }
                }
                _ => out.push(c),
            }
        }
    }

    fn term(&mut self) -> Result<Term> {
        self.skip_ws();
        if self.eat('<') {
            return Ok(Term::Uri(self.iri()?));
        }
        if self.eat('_') {
            return Ok(Term::Blank(self.blank_label()?));
        }
        if self.eat('"') {
            let lexical = self.quoted()?;
            if self.rest.starts_with("^^") {
                self.rest = &self.rest[2..];
                if !self.eat('<') {
                    return Err(self.error("expected '<' after '^^'"));
                }
                let datatype = self.iri()?;
                return Ok(Term::Literal {
                    lexical,
                    datatype: Some(datatype),
                    lang: None,
                });
            }
            if self.eat('@') {
                let end = self
                    .rest
                    .find(|c: char| c.is_whitespace() || c == '.')
                    .unwrap_or(self.rest.len());
                let lang = &self.rest[..end];
                if lang.is_empty() {
                    return Err(self.error("empty language tag"));
                }
                self.rest = &self.rest[end..];
                return Ok(Term::Literal {
                    lexical,
                    datatype: None,
                    lang: Some(lang.to_owned()),
                });
            }
            return Ok(Term::Literal {
                lexical,
                datatype: None,
                lang: None,
            });
        }
        Err(self.error("expected IRI, blank node, or literal"))
    }
}

fn parse_line(text: &str, line: usize) -> Result<Statement> {
    let mut scanner = Scanner::new(text, line);
    let subject = scanner.term()?;
    if matches!(subject, Term::Literal { .. }) {
        return Err(scanner.error("literal in subject position"));
    }
    let predicate = scanner.term()?;
    if !matches!(predicate, Term::Uri(_)) {
        return Err(scanner.error("predicate must be an IRI"));
    }
    let object = scanner.term()?;
    scanner.skip_ws();
    if !scanner.eat('.') {
        return Err(scanner.error("statement must end with '.'"));
    }
    scanner.skip_ws();
    if !scanner.rest.is_empty() && !scanner.rest.starts_with('#') {
        return Err(scanner.error("trailing content after '.'"));
    }
    Ok(Statement {
        subject,
        predicate,
        object,
    })
}
