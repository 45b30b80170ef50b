//! Tokenizer for the renderer's markup dialect.
//!
//! Lenient by construction: anything that does not form a tag is text.

use super::entities::decode_entities;
use crate::format::Attributes;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Open {
        name: String,
        attributes: Attributes,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    /// Comments, doctypes and processing instructions.
    Skipped,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == ':' || ch == '_'
}

/// Byte offset of the `>` closing a tag opened at `rest[0]`, skipping quoted
/// attribute values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, ch) in rest.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(index),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

fn parse_attributes(mut source: &str) -> Attributes {
    let mut attributes = Attributes::new();
    loop {
        source = source.trim_start();
        let Some(first) = source.chars().next() else {
            break;
        };
        let name_len = source
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/' || c == '>')
            .unwrap_or(source.len());
        if name_len == 0 {
            source = &source[first.len_utf8()..];
            continue;
        }
        let name = source[..name_len].to_ascii_lowercase();
        source = source[name_len..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = source.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let close = body.find(q).unwrap_or(body.len());
                    value = decode_entities(&body[..close]);
                    source = body.get(close + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = decode_entities(&after_eq[..end]);
                    source = &after_eq[end..];
                }
            }
        }
        attributes.insert(name, value);
    }
    attributes
}

impl<'a> Lexer<'a> {
    fn lex_tag(&self, rest: &'a str) -> Option<(Token<'a>, usize)> {
        if rest.starts_with("<!--") {
            let consumed = rest.find("-->").map_or(rest.len(), |i| i + 3);
            return Some((Token::Skipped, consumed));
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let consumed = rest.find('>').map_or(rest.len(), |i| i + 1);
            return Some((Token::Skipped, consumed));
        }

        let second = rest[1..].chars().next()?;
        if second == '/' {
            let body = &rest[2..];
            let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
            if name_len == 0 {
                return None;
            }
            let gt = rest.find('>')?;
            let name = body[..name_len].to_ascii_lowercase();
            return Some((Token::Close { name }, gt + 1));
        }

        if !second.is_ascii_alphabetic() {
            return None;
        }
        let gt = find_tag_end(rest)?;
        let mut inner = &rest[1..gt];
        let self_closing = inner.trim_end().ends_with('/');
        if self_closing {
            inner = inner.trim_end().trim_end_matches('/');
        }
        let name_len = inner.find(|c: char| !is_name_char(c)).unwrap_or(inner.len());
        let name = inner[..name_len].to_ascii_lowercase();
        let attributes = parse_attributes(&inner[name_len..]);
        Some((
            Token::Open {
                name,
                attributes,
                self_closing,
            },
            gt + 1,
        ))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with('<') {
            if let Some((token, consumed)) = self.lex_tag(rest) {
                self.pos += consumed;
                return Some(token);
            }
            self.pos += 1;
            return Some(Token::Text(&rest[..1]));
        }
        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        Some(Token::Text(&rest[..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> Token<'static> {
        Token::Open {
            name: name.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn lexes_tags_text_and_attributes() {
        let tokens: Vec<_> = Lexer::new(r#"a<A HREF="x&amp;y" target=_blank>b</a><img src='p.png'/>"#)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Text("a"),
                open("a", &[("href", "x&y"), ("target", "_blank")], false),
                Token::Text("b"),
                Token::Close {
                    name: "a".to_string()
                },
                open("img", &[("src", "p.png")], true),
            ]
        );
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        let tokens: Vec<_> = Lexer::new("1 < 2 <b").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Text("1 "),
                Token::Text("<"),
                Token::Text(" 2 "),
                Token::Text("<"),
                Token::Text("b"),
            ]
        );
    }

    #[test]
    fn skips_comments() {
        let tokens: Vec<_> = Lexer::new("x<!-- hidden <b> -->y").collect();
        assert_eq!(tokens, vec![Token::Text("x"), Token::Skipped, Token::Text("y")]);
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let tokens: Vec<_> = Lexer::new(r#"<a title="1>0">t</a>"#).collect();
        assert_eq!(tokens[0], open("a", &[("title", "1>0")], false));
    }
}
