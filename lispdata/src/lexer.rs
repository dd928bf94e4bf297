//! Streaming tokenizer over any [`Read`] source.
use crate::options::ReadOptions;
use logos::Logos;
use smol_str::SmolStr;
use std::io::{self, Read};

/// Kind and payload of a lexed token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    String(SmolStr),
    Integer(i64),
    Real(f64),
    True,
    False,
    /// The two characters `_(`, opening a translatable form.
    TranslationMark,
    Symbol(SmolStr),
    EndOfStream,
}

/// A token together with the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("end of file while parsing string started at line {line}")]
    UnterminatedString { line: usize },
    #[error("unknown constant '#{constant}'")]
    UnknownConstant { constant: SmolStr, line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LexError {
    pub fn line(&self) -> Option<usize> {
        match self {
            LexError::UnterminatedString { line } => Some(*line),
            LexError::UnknownConstant { line, .. } => Some(*line),
            LexError::Io(_) => None,
        }
    }
}

/// Pieces of a bare word, used to tell numbers from symbols.
#[derive(Debug, Clone, Copy, PartialEq, Logos)]
enum WordPiece {
    #[regex("[0-9]+")]
    Digits,
    #[token(".")]
    Dot,
    #[regex("[a-zA-Z]+")]
    Letters,
    #[regex(r"[^0-9a-zA-Z.]+")]
    Other,
}

/// Classifies a complete bare word as an integer, a real or a symbol.
///
/// Only words starting with a digit or `-` can be numbers. Such a word is a
/// symbol if it contains a letter, has no digit at all or has more than one
/// `.`; otherwise one `.` makes it a real and none an integer. Words that
/// pass these rules but still do not parse (`1-2`, integers beyond 64 bits)
/// are symbols as well.
pub fn classify_word(word: &str) -> TokenKind {
    let symbol = || TokenKind::Symbol(SmolStr::new(word));

    if !word.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return symbol();
    }

    let mut digits = false;
    let mut letters = false;
    let mut dots = 0usize;

    for piece in WordPiece::lexer(word) {
        match piece {
            Ok(WordPiece::Digits) => digits = true,
            Ok(WordPiece::Dot) => dots += 1,
            Ok(WordPiece::Letters) => letters = true,
            Ok(WordPiece::Other) | Err(()) => {}
        }
    }

    if letters || !digits || dots > 1 {
        return symbol();
    }

    if dots == 1 {
        word.parse().map(TokenKind::Real).unwrap_or_else(|_| symbol())
    } else {
        word.parse()
            .map(TokenKind::Integer)
            .unwrap_or_else(|_| symbol())
    }
}

pub(crate) fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

pub(crate) fn is_delimiter(c: u8) -> bool {
    matches!(c, b'"' | b'(' | b')' | b';')
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`.
fn partial_char_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xc0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => 1,
        };
        return if needed > back { back } else { 0 };
    }
    0
}

/// Outcome of making sure the buffer has a character to look at.
enum Fill {
    Ready,
    Exhausted,
}

/// Turns a byte stream into [`Token`]s.
///
/// Input is read in chunks into a fixed buffer. Once the source reports end
/// of file a single space is appended, so every token is followed by
/// whitespace before the stream runs out.
pub struct Lexer<R> {
    reader: R,
    buffer: Box<[u8]>,
    pos: usize,
    end: usize,
    exhausted: bool,
    line: usize,
    text: Vec<u8>,
    truncated: bool,
    max_string_length: usize,
    done: bool,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &ReadOptions::default())
    }

    pub fn with_options(reader: R, options: &ReadOptions) -> Self {
        Self {
            reader,
            buffer: vec![0; options.buffer_size.max(1)].into_boxed_slice(),
            pos: 0,
            end: 0,
            exhausted: false,
            line: 1,
            text: Vec::new(),
            truncated: false,
            max_string_length: options.max_string_length,
            done: false,
        }
    }

    /// The current line, starting at 1.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Lexes the next token. After the input is used up this keeps returning
    /// [`TokenKind::EndOfStream`].
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace()?;
            let line = self.line;

            let Some(c) = self.peek()? else {
                return Ok(Token {
                    kind: TokenKind::EndOfStream,
                    line,
                });
            };

            let kind = match c {
                b';' => {
                    self.skip_comment()?;
                    continue;
                }
                b'(' => {
                    self.bump();
                    TokenKind::OpenParen
                }
                b')' => {
                    self.bump();
                    TokenKind::CloseParen
                }
                b'"' => self.string()?,
                b'#' => self.constant()?,
                b'_' => {
                    self.bump();
                    if self.peek()? == Some(b'(') {
                        self.bump();
                        TokenKind::TranslationMark
                    } else {
                        self.start_text();
                        self.push_text(b'_');
                        self.word()?;
                        TokenKind::Symbol(self.take_text())
                    }
                }
                c if c.is_ascii_digit() || c == b'-' => {
                    self.start_text();
                    self.word()?;
                    classify_word(&self.take_text())
                }
                _ => {
                    self.start_text();
                    self.word()?;
                    TokenKind::Symbol(self.take_text())
                }
            };

            return Ok(Token { kind, line });
        }
    }

    fn fill(&mut self) -> io::Result<Fill> {
        if self.pos < self.end {
            return Ok(Fill::Ready);
        }
        if self.exhausted {
            return Ok(Fill::Exhausted);
        }

        let read = loop {
            match self.reader.read(&mut self.buffer) {
                Ok(read) => break read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };

        self.pos = 0;
        self.end = read;

        if read == 0 {
            self.buffer[0] = b' ';
            self.end = 1;
            self.exhausted = true;
        }

        Ok(Fill::Ready)
    }

    #[inline]
    fn peek(&mut self) -> io::Result<Option<u8>> {
        match self.fill()? {
            Fill::Ready => Ok(Some(self.buffer[self.pos])),
            Fill::Exhausted => Ok(None),
        }
    }

    /// Consumes the character last returned by `peek`.
    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn start_text(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    fn push_text(&mut self, c: u8) {
        if self.text.len() < self.max_string_length {
            self.text.push(c);
        } else {
            self.truncated = true;
        }
    }

    /// Decodes the accumulated text. If it was cut short, a character split
    /// by the cut is dropped whole.
    fn take_text(&mut self) -> SmolStr {
        if self.truncated {
            let partial = partial_char_len(&self.text);
            self.text.truncate(self.text.len() - partial);
        }
        SmolStr::new(String::from_utf8_lossy(&self.text))
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(c) = self.peek()? {
            if !is_space(c) {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }
            self.bump();
        }
        Ok(())
    }

    fn skip_comment(&mut self) -> io::Result<()> {
        while let Some(c) = self.peek()? {
            self.bump();
            if c == b'\n' {
                self.line += 1;
                break;
            }
        }
        Ok(())
    }

    fn word(&mut self) -> io::Result<()> {
        while let Some(c) = self.peek()? {
            if is_space(c) || is_delimiter(c) {
                break;
            }
            self.push_text(c);
            self.bump();
        }
        Ok(())
    }

    fn string(&mut self) -> Result<TokenKind, LexError> {
        let start = self.line;
        self.bump();
        self.start_text();

        loop {
            let Some(c) = self.peek()? else {
                return Err(LexError::UnterminatedString { line: start });
            };
            self.bump();

            let (raw, c) = match c {
                b'"' => break,
                b'\\' => {
                    let Some(escaped) = self.peek()? else {
                        return Err(LexError::UnterminatedString { line: start });
                    };
                    self.bump();
                    let c = match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        other => other,
                    };
                    (escaped, c)
                }
                other => (other, other),
            };

            if raw == b'\n' {
                self.line += 1;
            }

            self.push_text(c);
        }

        Ok(TokenKind::String(self.take_text()))
    }

    fn constant(&mut self) -> Result<TokenKind, LexError> {
        self.bump();
        self.start_text();

        // Constants are not subject to the string length limit.
        while let Some(c) = self.peek()? {
            if !(c.is_ascii_alphanumeric() || c == b'_') {
                break;
            }
            self.text.push(c);
            self.bump();
        }

        match self.text.as_slice() {
            b"t" => Ok(TokenKind::True),
            b"f" => Ok(TokenKind::False),
            _ => Err(LexError::UnknownConstant {
                constant: self.take_text(),
                line: self.line,
            }),
        }
    }
}

/// Yields tokens up to (not including) the end of the stream, stopping
/// after the first error.
impl<R: Read> Iterator for Lexer<R> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_token() {
            Ok(Token {
                kind: TokenKind::EndOfStream,
                ..
            }) => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
