//! Parse s-expression documents into a [`Node`] tree.
use crate::lexer::{LexError, Lexer, TokenKind};
use crate::node::{Atom, Node, TRANSLATION_HEAD};
use crate::options::ReadOptions;
use delegate::delegate;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, trace};

/// A parse error.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed token, such as an unterminated string or an unknown `#` constant.
    #[error("line {line}: {message}")]
    Lexical { message: String, line: usize },
    /// Unbalanced parentheses.
    #[error("line {line}: {message}")]
    Structural { message: String, line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ParseError {
    pub fn lexical(message: impl Display, line: usize) -> Self {
        Self::Lexical {
            message: message.to_string(),
            line,
        }
    }

    pub fn structural(message: impl Display, line: usize) -> Self {
        Self::Structural {
            message: message.to_string(),
            line,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Lexical { line, .. } | ParseError::Structural { line, .. } => Some(*line),
            ParseError::Io(_) => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::Io(err) => Self::Io(err),
            other => {
                let line = other.line().unwrap_or_default();
                Self::lexical(&other, line)
            }
        }
    }
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// A list that has been opened but not yet closed.
struct Frame {
    items: Vec<Node>,
    line: usize,
}

/// Builds a document tree from a token stream.
pub struct Parser<R> {
    lexer: Lexer<R>,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &ReadOptions::default())
    }

    pub fn with_options(reader: R, options: &ReadOptions) -> Self {
        Self {
            lexer: Lexer::with_options(reader, options),
        }
    }

    delegate! {
        to self.lexer {
            /// The line the parser has reached.
            pub fn line(&self) -> usize;
        }
    }

    /// Parses the whole input. The top level is a sequence of values without
    /// surrounding parentheses; it is returned as the children of a root list.
    pub fn parse_document(mut self) -> Result<Node> {
        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let token = self.lexer.next_token()?;

            let node = match token.kind {
                TokenKind::OpenParen => {
                    stack.push(Frame {
                        items: Vec::new(),
                        line: token.line,
                    });
                    continue;
                }
                TokenKind::TranslationMark => {
                    stack.push(Frame {
                        items: vec![Node::symbol(TRANSLATION_HEAD)],
                        line: token.line,
                    });
                    continue;
                }
                TokenKind::CloseParen => match stack.pop() {
                    Some(frame) => Node::List(frame.items),
                    None => return Err(ParseError::structural("unexpected ')'", token.line)),
                },
                TokenKind::EndOfStream => match stack.last() {
                    Some(frame) => {
                        return Err(ParseError::structural(
                            format!(
                                "unexpected end of file, list opened at line {} is not closed",
                                frame.line
                            ),
                            frame.line,
                        ))
                    }
                    None => break,
                },
                TokenKind::String(string) => Atom::String(string).into(),
                TokenKind::Integer(int) => Atom::Integer(int).into(),
                TokenKind::Real(real) => Atom::Real(real.into()).into(),
                TokenKind::True => Atom::Boolean(true).into(),
                TokenKind::False => Atom::Boolean(false).into(),
                TokenKind::Symbol(symbol) => Atom::Symbol(symbol).into(),
            };

            match stack.last_mut() {
                Some(frame) => frame.items.push(node),
                None => root.push(node),
            }
        }

        trace!(forms = root.len(), "parsed document");
        Ok(Node::List(root))
    }
}

/// Parse a document from a byte stream.
pub fn parse<R: Read>(reader: R) -> Result<Node> {
    Parser::new(reader).parse_document()
}

/// Parse a document from a byte stream with the given options.
pub fn parse_with_options<R: Read>(reader: R, options: &ReadOptions) -> Result<Node> {
    Parser::with_options(reader, options).parse_document()
}

/// Parse a document from a string.
pub fn from_str(source: &str) -> Result<Node> {
    parse(source.as_bytes())
}

/// Open and parse the document stored at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Node> {
    let path = path.as_ref();
    debug!(path = %path.display(), "parsing file");

    let file = File::open(path)?;
    parse(file).inspect_err(|err| debug!(path = %path.display(), %err, "failed to parse file"))
}

#[cfg(test)]
mod test {
    use super::{from_str, parse_file, parse_with_options, ParseError};
    use crate::node::{Atom, Node};
    use crate::options::ReadOptions;
    use rstest::rstest;
    use std::io::Write as _;

    fn list(items: Vec<Node>) -> Node {
        Node::List(items)
    }

    #[test]
    fn empty_document() {
        assert_eq!(list(vec![]), from_str("").unwrap());
        assert_eq!(list(vec![]), from_str("; nothing here\n").unwrap());
    }

    #[test]
    fn top_level_sequence() {
        let root = from_str("(a 1) (b \"two\") 3").unwrap();
        assert_eq!(
            list(vec![
                list(vec![Node::symbol("a"), Node::from(1i64)]),
                list(vec![Node::symbol("b"), Node::from("two")]),
                Node::from(3i64),
            ]),
            root
        );
    }

    #[test]
    fn nested_lists() {
        let root = from_str("(a (b (c #f) ()) 2.5)").unwrap();
        assert_eq!(
            list(vec![list(vec![
                Node::symbol("a"),
                list(vec![
                    Node::symbol("b"),
                    list(vec![Node::symbol("c"), Node::from(false)]),
                    list(vec![]),
                ]),
                Node::from(2.5),
            ])]),
            root
        );
    }

    #[rstest]
    #[case("42", Atom::Integer(42))]
    #[case("-5", Atom::Integer(-5))]
    #[case("3.14", Atom::Real(3.14.into()))]
    #[case("3.1.4", Atom::Symbol("3.1.4".into()))]
    #[case("12abc", Atom::Symbol("12abc".into()))]
    #[case("#t", Atom::Boolean(true))]
    #[case("#f", Atom::Boolean(false))]
    #[case("\"x\\ty\"", Atom::String("x\ty".into()))]
    fn atoms(#[case] source: &str, #[case] expected: Atom) {
        assert_eq!(list(vec![Node::Atom(expected)]), from_str(source).unwrap());
    }

    #[test]
    fn comments_are_transparent() {
        assert_eq!(from_str("(foo 1)").unwrap(), from_str("; hi\n(foo 1)").unwrap());
    }

    #[test]
    fn translation_forms() {
        let root = from_str(r#"(title _("Hello"))"#).unwrap();
        assert_eq!(
            list(vec![list(vec![
                Node::symbol("title"),
                list(vec![Node::symbol("_"), Node::from("Hello")]),
            ])]),
            root
        );
        assert_eq!(
            from_str(r#"(title (_ "Hello"))"#).unwrap(),
            root,
        );
    }

    #[test]
    fn deep_nesting() {
        let depth = 200_000;
        let source = "(".repeat(depth) + &")".repeat(depth);
        let root = from_str(&source).unwrap();
        let mut node = &root.as_list().unwrap()[0];
        let mut seen = 1;
        while let Some([inner]) = node.as_list() {
            node = inner;
            seen += 1;
        }
        assert_eq!(depth, seen);
    }

    #[rstest]
    #[case(")", 1)]
    #[case("(a 1)\n(b 2))", 2)]
    #[case("(a)\n\n)", 3)]
    fn unmatched_close(#[case] source: &str, #[case] line: usize) {
        let err = from_str(source).unwrap_err();
        assert!(matches!(err, ParseError::Structural { .. }), "{err:?}");
        assert_eq!(Some(line), err.line());
    }

    #[rstest]
    #[case("(", 1)]
    #[case("(a\n  (b 1)\n", 1)]
    #[case("(a 1)\n(b\n(c 2)", 2)]
    #[case("(a 1)\n(b (c\n", 2)]
    fn unclosed_list(#[case] source: &str, #[case] line: usize) {
        let err = from_str(source).unwrap_err();
        assert!(matches!(err, ParseError::Structural { .. }), "{err:?}");
        assert_eq!(Some(line), err.line());
    }

    #[test]
    fn unterminated_string() {
        let err = from_str("(foo \"bar").unwrap_err();
        assert!(matches!(err, ParseError::Lexical { line: 1, .. }), "{err:?}");
        assert_eq!("line 1: end of file while parsing string started at line 1", err.to_string());
    }

    #[test]
    fn unknown_constant() {
        let err = from_str("(a 1)\n(b #xyz)").unwrap_err();
        assert!(matches!(err, ParseError::Lexical { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn small_buffer() {
        let source = "(highscores (file-version 3) (name \"x y\"))";
        let options = ReadOptions::default().with_buffer_size(3);
        assert_eq!(
            from_str(source).unwrap(),
            parse_with_options(source.as_bytes(), &options).unwrap()
        );
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(settings (volume 80))").unwrap();
        let root = parse_file(file.path()).unwrap();
        assert_eq!(
            Some(80i64),
            root.get_list("settings").unwrap().value("volume")
        );
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(dir.path().join("absent.scm")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
        assert_eq!(None, err.line());
    }
}
