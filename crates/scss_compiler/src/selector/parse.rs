//! Minimal selector-text parser.
//!
//! The external parser hands the core fully parsed selector lists, except for
//! selector *schemas*: a selector containing `#{...}` interpolation first
//! evaluates to plain text and must then become a selector list again. This
//! module owns that re-parse step. It covers the CSS selector grammar the
//! compiler manipulates (types with namespaces, classes, ids, attributes,
//! pseudos, placeholders, `&`, the four combinators, comma lists) and nothing
//! more; source-file parsing proper stays outside the core.

use crate::arena::{Arena, alloc_slice, alloc_str};

use super::{
    AttrMatcher, Combinator, Complex, ComplexPart, Compound, Namespace, SelectorList,
    SimpleSelector,
};

/// Error from [`parse_selector`], carrying the byte offset of the failure
/// within the parsed text.
#[derive(Debug, Clone)]
pub struct SelectorParseError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for SelectorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid selector: {} (at offset {})", self.message, self.offset)
    }
}

/// Pseudo-classes whose argument is itself a selector list.
fn is_selector_pseudo(name: &str) -> bool {
    matches!(
        name,
        "not" | "is" | "where" | "matches" | "has" | "any" | "-moz-any" | "-webkit-any"
    )
}

/// Parse a selector list from text, allocating all nodes in `arena`.
pub fn parse_selector<'a>(
    arena: &'a Arena,
    text: &str,
) -> Result<SelectorList<'a>, SelectorParseError> {
    let mut parser = Parser {
        arena,
        bytes: text.as_bytes(),
        pos: 0,
    };
    let list = parser.parse_list()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("trailing input"));
    }
    Ok(list)
}

struct Parser<'a, 't> {
    arena: &'a Arena,
    bytes: &'t [u8],
    pos: usize,
}

impl<'a> Parser<'a, '_> {
    fn error(&self, message: &str) -> SelectorParseError {
        SelectorParseError {
            message: message.to_string(),
            offset: self.pos,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn is_ident_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
    }

    fn ident(&mut self) -> Result<&'a str, SelectorParseError> {
        let start = self.pos;
        while self.peek().is_some_and(Self::is_ident_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.error("invalid utf-8 in identifier"))?;
        Ok(alloc_str(self.arena, text))
    }

    fn parse_list(&mut self) -> Result<SelectorList<'a>, SelectorParseError> {
        let mut members = Vec::new();
        loop {
            members.push(self.parse_complex()?);
            self.skip_whitespace();
            if !self.eat(b',') {
                break;
            }
        }
        Ok(SelectorList::new(alloc_slice(self.arena, &members)))
    }

    fn parse_complex(&mut self) -> Result<Complex<'a>, SelectorParseError> {
        let mut parts: Vec<ComplexPart<'a>> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(b',' | b')') => break,
                Some(b'>') => {
                    self.pos += 1;
                    parts.push(ComplexPart::Combinator(Combinator::Child));
                }
                Some(b'+') => {
                    self.pos += 1;
                    parts.push(ComplexPart::Combinator(Combinator::NextSibling));
                }
                Some(b'~') => {
                    self.pos += 1;
                    parts.push(ComplexPart::Combinator(Combinator::FollowingSibling));
                }
                Some(_) => {
                    let compound = self.parse_compound()?;
                    parts.push(ComplexPart::Compound(compound));
                }
            }
        }
        if parts.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(Complex::new(alloc_slice(self.arena, &parts)))
    }

    fn parse_compound(&mut self) -> Result<Compound<'a>, SelectorParseError> {
        let mut simples = Vec::new();
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Class(self.ident()?));
                }
                Some(b'#') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Id(self.ident()?));
                }
                Some(b'%') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Placeholder(self.ident()?));
                }
                Some(b'&') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Parent);
                    // `&-suffix` keeps the suffix as a trailing type token;
                    // parentize concatenates it onto the parent's last simple.
                    if self.peek().is_some_and(Self::is_ident_byte) {
                        let name = self.ident()?;
                        simples.push(SimpleSelector::Type {
                            ns: Namespace::None,
                            name,
                        });
                    }
                }
                Some(b'[') => {
                    self.pos += 1;
                    simples.push(self.parse_attribute()?);
                }
                Some(b':') => {
                    self.pos += 1;
                    simples.push(self.parse_pseudo()?);
                }
                Some(b'*') => {
                    if self.peek_at(1) == Some(b'|') {
                        self.pos += 2;
                        let name = self.type_name()?;
                        simples.push(SimpleSelector::Type {
                            ns: Namespace::Any,
                            name,
                        });
                    } else {
                        self.pos += 1;
                        simples.push(SimpleSelector::UNIVERSAL);
                    }
                }
                Some(b) if Self::is_ident_byte(b) => {
                    let name = self.ident()?;
                    if self.peek() == Some(b'|') && self.peek_at(1) != Some(b'=') {
                        self.pos += 1;
                        let local = self.type_name()?;
                        simples.push(SimpleSelector::Type {
                            ns: Namespace::Named(name),
                            name: local,
                        });
                    } else {
                        simples.push(SimpleSelector::Type {
                            ns: Namespace::None,
                            name,
                        });
                    }
                }
                _ => break,
            }
            // A compound ends at whitespace, a combinator, a comma or `)`.
            match self.peek() {
                Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'+' | b'~' | b',' | b')') | None => {
                    break;
                }
                _ => {}
            }
        }
        if simples.is_empty() {
            return Err(self.error("expected simple selector"));
        }
        Ok(Compound::new(alloc_slice(self.arena, &simples)))
    }

    fn type_name(&mut self) -> Result<&'a str, SelectorParseError> {
        if self.eat(b'*') {
            Ok(alloc_str(self.arena, "*"))
        } else {
            self.ident()
        }
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector<'a>, SelectorParseError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let matcher = match self.peek() {
            Some(b']') => {
                self.pos += 1;
                return Ok(SimpleSelector::Attribute {
                    name,
                    matcher: AttrMatcher::Exists,
                    value: None,
                    flag: None,
                });
            }
            Some(b'=') => {
                self.pos += 1;
                AttrMatcher::Equals
            }
            Some(b'~') => {
                self.pos += 1;
                self.expect(b'=')?;
                AttrMatcher::Includes
            }
            Some(b'|') => {
                self.pos += 1;
                self.expect(b'=')?;
                AttrMatcher::DashMatch
            }
            Some(b'^') => {
                self.pos += 1;
                self.expect(b'=')?;
                AttrMatcher::Prefix
            }
            Some(b'$') => {
                self.pos += 1;
                self.expect(b'=')?;
                AttrMatcher::Suffix
            }
            Some(b'*') => {
                self.pos += 1;
                self.expect(b'=')?;
                AttrMatcher::Substring
            }
            _ => return Err(self.error("expected attribute matcher or `]`")),
        };
        self.skip_whitespace();
        let value = self.attribute_value()?;
        self.skip_whitespace();
        let flag = if self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            let f = self.bump().map(char::from);
            self.skip_whitespace();
            f
        } else {
            None
        };
        self.expect(b']')?;
        Ok(SimpleSelector::Attribute {
            name,
            matcher,
            value: Some(value),
            flag,
        })
    }

    fn attribute_value(&mut self) -> Result<&'a str, SelectorParseError> {
        if let Some(quote @ (b'"' | b'\'')) = self.peek() {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|b| b != quote) {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.bytes[start..self.pos])
                .map_err(|_| self.error("invalid utf-8 in attribute value"))?;
            let text = alloc_str(self.arena, text);
            self.expect(quote)?;
            Ok(text)
        } else {
            self.ident()
        }
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector<'a>, SelectorParseError> {
        let element = self.eat(b':');
        let name = self.ident()?;
        if !self.eat(b'(') {
            return Ok(SimpleSelector::Pseudo {
                name,
                element,
                arg: None,
            });
        }
        if !element && is_selector_pseudo(name) {
            let arg = self.parse_list()?;
            self.skip_whitespace();
            self.expect(b')')?;
            return Ok(SimpleSelector::Wrapped { name, arg });
        }
        // Opaque argument: capture balanced text up to the matching paren.
        let start = self.pos;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some(b'(') => depth += 1,
                Some(b')') => depth -= 1,
                Some(_) => {}
                None => return Err(self.error("unclosed `(` in pseudo argument")),
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos - 1])
            .map_err(|_| self.error("invalid utf-8 in pseudo argument"))?;
        Ok(SimpleSelector::Pseudo {
            name,
            element,
            arg: Some(alloc_str(self.arena, text.trim())),
        })
    }

    fn expect(&mut self, b: u8) -> Result<(), SelectorParseError> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", char::from(b))))
        }
    }
}
