//! S-expression reader and printer for the KiCad board format.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Input ended inside an open list")]
    UnexpectedEof,
    #[error("Unbalanced ')' at byte {0}")]
    Unbalanced(usize),
    #[error("Unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("Missing value #{index} in {item}")]
    MissingValue { index: usize, item: String },
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn atom(value: impl Into<String>) -> Self {
        SExp::Atom(value.into())
    }

    /// `(key v1 v2 ...)` with every value as an atom
    pub fn node<I, S>(key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items = vec![SExp::atom(key)];
        items.extend(values.into_iter().map(|v| SExp::Atom(v.into())));
        SExp::List(items)
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// Head atom of a list, e.g. `segment` for `(segment ...)`
    pub fn tag(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// First child list whose head is `key`.
    pub fn child(&self, key: &str) -> Option<&SExp> {
        self.as_list()?
            .iter()
            .find(|item| item.tag() == Some(key))
    }

    pub fn children<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SExp> + 'a {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter(move |item| item.tag() == Some(key))
    }

    /// Atom at `index` of this list (index 0 is the head).
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.as_list()?.get(index)?.as_atom()
    }

    pub fn number_at(&self, index: usize) -> Result<f64, ParseError> {
        let raw = self
            .atom_at(index)
            .ok_or_else(|| ParseError::MissingValue {
                index,
                item: self.to_string(),
            })?;
        raw.parse()
            .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
    }

    /// First value of the child `(key value ...)`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.child(key)?.atom_at(1)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key)?.parse().ok()
    }
}

impl fmt::Display for SExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Atom(s) => {
                let needs_quotes = s.is_empty()
                    || s.chars().any(|c| c.is_whitespace() || c == '(' || c == ')' || c == '"');
                if needs_quotes {
                    write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    write!(f, "{}", s)
                }
            }
            SExp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reads one top-level expression from a borrowed source.
///
/// Atoms are split on whitespace and parentheses; double-quoted atoms may
/// contain both and support `\\`, `\"`, `\n`, `\t` and `\r` escapes.
pub struct SExpParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> SExpParser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        // Lists still open, innermost last
        let mut open: Vec<Vec<SExp>> = Vec::new();

        loop {
            let Some(c) = self.next_significant() else {
                return Err(ParseError::UnexpectedEof);
            };

            let item = match c {
                '(' => {
                    self.pos += 1;
                    open.push(Vec::new());
                    continue;
                }
                ')' => {
                    let items = open.pop().ok_or(ParseError::Unbalanced(self.pos))?;
                    self.pos += 1;
                    SExp::List(items)
                }
                '"' => self.quoted()?,
                _ => self.bare(),
            };

            match open.last_mut() {
                Some(parent) => parent.push(item),
                None => return Ok(item),
            }
        }
    }

    /// Skip whitespace and return the next character without consuming it.
    fn next_significant(&mut self) -> Option<char> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        trimmed.chars().next()
    }

    fn bare(&mut self) -> SExp {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .unwrap_or(rest.len());
        self.pos += len;
        SExp::atom(&rest[..len])
    }

    fn quoted(&mut self) -> Result<SExp, ParseError> {
        let opening = self.pos;
        let mut text = String::new();
        let mut chars = self.src[opening + 1..].char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = opening + 1 + offset + 1;
                    return Ok(SExp::Atom(text));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                _ => text.push(c),
            }
        }

        Err(ParseError::UnterminatedString(opening))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> SExp {
        SExpParser::new(input).parse().unwrap()
    }

    #[test]
    fn test_parse_quoted_atom() {
        assert_eq!(parse("\"F.Fab layer\""), SExp::atom("F.Fab layer"));
        assert_eq!(parse(r#""a \"b\"""#), SExp::atom("a \"b\""));
    }

    #[test]
    fn test_parse_nested_lists() {
        let sexp = parse("(gr_line (start 1 2) (end 3 4) (layer \"Edge.Cuts\"))");
        assert_eq!(sexp.tag(), Some("gr_line"));
        let start = sexp.child("start").unwrap();
        assert_eq!(start.number_at(1).unwrap(), 1.0);
        assert_eq!(start.number_at(2).unwrap(), 2.0);
        assert_eq!(sexp.value("layer"), Some("Edge.Cuts"));
        assert!(sexp.child("width").is_none());
    }

    #[test]
    fn test_children() {
        let sexp = parse("(kicad_pcb (net 0 \"\") (net 1 GND) (segment))");
        let nets: Vec<_> = sexp.children("net").collect();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[1].atom_at(2), Some("GND"));
    }

    #[test]
    fn test_invalid_number() {
        let sexp = parse("(width abc)");
        assert!(matches!(sexp.number_at(1), Err(ParseError::InvalidNumber(_))));
        assert_eq!(sexp.number("width"), None);
        assert!(matches!(
            sexp.number_at(2),
            Err(ParseError::MissingValue { index: 2, .. })
        ));
    }

    #[test]
    fn test_unterminated_input() {
        assert!(matches!(
            SExpParser::new("(a (b c)").parse(),
            Err(ParseError::UnexpectedEof)
        ));
        assert!(matches!(
            SExpParser::new("\"open").parse(),
            Err(ParseError::UnterminatedString(0))
        ));
        assert!(matches!(
            SExpParser::new("  )").parse(),
            Err(ParseError::Unbalanced(2))
        ));
    }

    #[test]
    fn test_multibyte_atoms() {
        let sexp = parse("(gr_text \"Ω µm\" (at 1 2))");
        assert_eq!(sexp.atom_at(1), Some("Ω µm"));
        assert_eq!(sexp.child("at").and_then(|at| at.atom_at(2)), Some("2"));
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let sexp = SExp::List(vec![
            SExp::node("layer", ["F.Fab"]),
            SExp::node("text", ["$date$ 2024-01-01"]),
            SExp::node("net", ["0", ""]),
        ]);
        assert_eq!(
            sexp.to_string(),
            r#"((layer F.Fab) (text "$date$ 2024-01-01") (net 0 ""))"#
        );
        assert_eq!(parse(&sexp.to_string()), sexp);
    }
}
