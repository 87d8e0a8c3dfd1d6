//! The character-level tokenizer for `.obj` input.
//!
//! The [`Lexer`] is a state machine fed one character at a time. Runs of
//! characters of the same class accumulate into a buffer, and a change of
//! class flushes the buffer as a finished [`Token`].
use std::fmt;
use std::mem;

use log::debug;

/// A lexical token, tagged with the 1-based position where its source text
/// begins.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
  /// What was recognized, along with any payload.
  pub kind: TokenKind,
  /// 1-based line holding the token's first character.
  pub line_number: usize,
  /// 1-based column of the token's first character.
  pub char_number: usize,
}

/// Every kind of token the tokenizer can produce.
///
/// Payloads live in the variants themselves, so a token can never carry data
/// of the wrong shape for its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
  /// A whole-line comment, including the leading `#`.
  Comment(String),
  /// The `mtllib` keyword.
  MaterialLib,
  /// The `o` keyword.
  Object,
  /// The `v` keyword.
  Vertex,
  /// The `vn` keyword.
  Normal,
  /// The `vt` keyword.
  TexCoord,
  /// The `usemtl` keyword.
  UseMaterial,
  /// The `f` keyword.
  Face,
  /// The `s` keyword.
  SmoothShading,
  /// A floating point literal.
  Number(f64),
  /// Any word that is neither a keyword, a number, nor a polygon corner.
  String(String),
  /// A slash-delimited polygon corner such as `1/2/3` or `1//2`.
  Polygon(PolygonIndices),
  /// A run of spaces and/or tabs.
  Separator,
  /// A line ending; the payload is the raw text (`"\n"`, `"\r"` or `"\n\r"`).
  LineBreak(String),
}

impl TokenKind {
  /// The kind's name as printed in diagnostics.
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Comment(_) => "COMMENT",
      TokenKind::MaterialLib => "MATERIAL_LIB",
      TokenKind::Object => "OBJECT",
      TokenKind::Vertex => "VERTEX",
      TokenKind::Normal => "NORMAL",
      TokenKind::TexCoord => "TEX_COORD",
      TokenKind::UseMaterial => "USE_MATERIAL",
      TokenKind::Face => "FACE",
      TokenKind::SmoothShading => "SMOOTH_SHADING",
      TokenKind::Number(_) => "NUMBER",
      TokenKind::String(_) => "STRING",
      TokenKind::Polygon(_) => "POLYGON",
      TokenKind::Separator => "SEPARATOR",
      TokenKind::LineBreak(_) => "LINE_BREAK",
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// The indices of one face corner: vertex, texture vertex and normal, each
/// optional. A corner written `1/2` leaves `normal` absent.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonIndices {
  pub vertex: Option<i64>,
  pub texture: Option<i64>,
  pub normal: Option<i64>,
}

/// What class of character the tokenizer is currently accumulating.
#[derive(Clone, Copy, PartialEq)]
enum State {
  Token,
  Separator,
  Comment,
  LineBreak,
}

/// The mutually exclusive character classes driving state transitions.
#[derive(Clone, Copy, PartialEq)]
enum CharClass {
  LineEnding,
  Separator,
  CommentStart,
  Normal,
}

impl CharClass {
  fn of(c: char) -> CharClass {
    match c {
      '\n' | '\r' => CharClass::LineEnding,
      '#' => CharClass::CommentStart,
      c if c.is_whitespace() => CharClass::Separator,
      _ => CharClass::Normal,
    }
  }
}

/// The tokenizer. Consumes a character stream exactly once and yields the
/// complete token sequence covering it.
pub struct Lexer<I> {
  stream: I,
  tokens: Vec<Token>,
  buffer: String,
  state: Option<State>,
  char_pos: usize,
  line_num: usize,
}

impl<I: Iterator<Item = char>> Lexer<I> {
  /// Creates a tokenizer over a character stream.
  pub fn new(stream: I) -> Lexer<I> {
    Lexer {
      stream,
      tokens: vec![],
      buffer: String::new(),
      state: None,
      char_pos: 0,
      line_num: 1,
    }
  }

  /// Reads the stream to exhaustion and returns every token in source order.
  ///
  /// Tokenizing cannot fail: anything unrecognizable becomes a `String`
  /// token and is left for the statement parser to reject.
  pub fn lex_tokens(mut self) -> Vec<Token> {
    while let Some(c) = self.stream.next() {
      self.step(c);
    }
    self.flush_buffer();

    self.tokens
  }

  fn step(&mut self, c: char) {
    match (self.state, CharClass::of(c)) {
      // A line ending while already inside a line break extends the buffer
      // only when it completes the `"\n\r"` composite. `\r\n` stays two
      // separate tokens.
      (Some(State::LineBreak), CharClass::LineEnding) => {
        if !(c == '\r' && self.buffer == "\n") {
          self.flush_buffer();
        }
      }
      (_, CharClass::LineEnding) => {
        self.flush_buffer();
        self.state = Some(State::LineBreak);
      }
      // Comments absorb everything up to a line ending, `#` and
      // whitespace included.
      (Some(State::Comment), _) => {}
      (Some(State::Separator), CharClass::Separator) => {}
      (_, CharClass::Separator) => {
        self.flush_buffer();
        self.state = Some(State::Separator);
      }
      (_, CharClass::CommentStart) => {
        self.flush_buffer();
        self.state = Some(State::Comment);
      }
      (Some(State::Token), CharClass::Normal) => {}
      (_, CharClass::Normal) => {
        self.flush_buffer();
        self.state = Some(State::Token);
      }
    }

    self.buffer.push(c);
    self.char_pos += 1;
  }

  fn flush_buffer(&mut self) {
    if self.buffer.is_empty() {
      return;
    }

    let text = mem::replace(&mut self.buffer, String::new());
    let char_number = self.char_pos - text.chars().count() + 1;
    let line_number = self.line_num;

    let kind = match self.state {
      Some(State::Comment) => TokenKind::Comment(text),
      Some(State::LineBreak) => {
        self.line_num += 1;
        self.char_pos = 0;
        TokenKind::LineBreak(text)
      }
      Some(State::Separator) => TokenKind::Separator,
      Some(State::Token) | None => classify_word(text),
    };

    self.tokens.push(Token {
      kind,
      line_number,
      char_number,
    });
  }
}

/// Classifies a flushed word buffer: keyword table first, then a number,
/// then a polygon corner, and finally the string fallback.
fn classify_word(text: String) -> TokenKind {
  match text.as_str() {
    "mtllib" => return TokenKind::MaterialLib,
    "o" => return TokenKind::Object,
    "v" => return TokenKind::Vertex,
    "vn" => return TokenKind::Normal,
    "vt" => return TokenKind::TexCoord,
    "usemtl" => return TokenKind::UseMaterial,
    "f" => return TokenKind::Face,
    "s" => return TokenKind::SmoothShading,
    _ => {}
  }

  if let Ok(value) = lexical::parse::<f64, _>(&text) {
    return TokenKind::Number(value);
  }

  match lex_polygon(&text) {
    Some(indices) => TokenKind::Polygon(indices),
    None => {
      // A malformed corner falls back to a plain string rather than
      // failing the whole lex.
      if text.contains('/') {
        debug!("word {:?} is not a polygon corner, lexing as string", text);
      }
      TokenKind::String(text)
    }
  }
}

/// Attempts to read a word as a slash-delimited polygon corner.
///
/// Empty fields mean absent indices, so `1//2` is `(1, -, 2)` and `1/3/` is
/// `(1, 3, -)`. More than two dividers, or a field that is not an integer,
/// means the word is not a polygon corner at all.
fn lex_polygon(text: &str) -> Option<PolygonIndices> {
  let mut indices: [Option<i64>; 3] = [None; 3];
  let mut count = 0;

  for field in text.split('/') {
    if count == indices.len() {
      return None;
    }
    indices[count] = if field.is_empty() {
      None
    } else {
      Some(lexical::parse::<i64, _>(field).ok()?)
    };
    count += 1;
  }

  Some(PolygonIndices {
    vertex: indices[0],
    texture: indices[1],
    normal: indices[2],
  })
}
