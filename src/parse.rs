//! The statement-level parser over the token sequence.
//!
//! Each `.obj` statement is one line: a header keyword (or a comment)
//! followed by a fixed number of separator-delimited fields and a line
//! break. The [`Parser`] walks the token sequence with a small state
//! machine per statement type and fails on the first token that breaks
//! the grammar.
use thiserror::Error;

use crate::lex::{PolygonIndices, Token, TokenKind};

/// A single statement, i.e. one line's worth of meaning, tagged with the
/// position of its first token.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
  /// What the statement says.
  pub kind: StatementKind,
  /// 1-based line of the statement's first token.
  pub line_number: usize,
  /// 1-based column of the statement's first token.
  pub char_number: usize,
}

/// Every kind of statement, with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
  /// A whole-line comment, including the leading `#`.
  Comment(String),
  /// `mtllib <file>`: a material library the file depends on.
  MaterialLib(String),
  /// `o <name>`: starts a named object.
  Object(String),
  /// `v <x> <y> <z>`: a geometric vertex.
  Vertex(f64, f64, f64),
  /// `vn <x> <y> <z>`: a vertex normal.
  Normal(f64, f64, f64),
  /// `vt <u> <v>`: a texture coordinate.
  TexCoord(f64, f64),
  /// `usemtl <name>`: selects a material for the faces that follow.
  UseMaterial(String),
  /// `f <corner> <corner> <corner>`: a triangular face.
  Face(PolygonIndices, PolygonIndices, PolygonIndices),
  /// `s <group>`: a smoothing group setting.
  SmoothShading(f64),
}

/// A token violated the grammar of the statement being parsed. Parsing
/// stops at the first such token; nothing is recovered.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
  /// A token appeared where the current statement's grammar does not
  /// allow it.
  #[error("unexpected token: {kind} on line: {line_number} at: {char_number}")]
  UnexpectedToken {
    /// Diagnostic name of the offending token's kind.
    kind: &'static str,
    /// Line of the offending token.
    line_number: usize,
    /// Column of the offending token.
    char_number: usize,
  },
  /// A data token appeared between statements, where only a header
  /// keyword or a comment may start a new statement.
  #[error("unexpected token: {kind} on line: {line_number} at: {char_number}, expected statement start")]
  ExpectedStatementStart {
    /// Diagnostic name of the offending token's kind.
    kind: &'static str,
    /// Line of the offending token.
    line_number: usize,
    /// Column of the offending token.
    char_number: usize,
  },
}

/// Which statement type a header token opens.
#[derive(Clone, Copy, PartialEq)]
enum Header {
  Comment,
  MaterialLib,
  Object,
  UseMaterial,
  Vertex,
  Normal,
  TexCoord,
  SmoothShading,
  Face,
}

impl Header {
  /// How many data fields follow the header keyword.
  fn field_count(self) -> usize {
    match self {
      Header::Comment => 0,
      Header::MaterialLib | Header::Object | Header::UseMaterial => 1,
      Header::SmoothShading => 1,
      Header::TexCoord => 2,
      Header::Vertex | Header::Normal | Header::Face => 3,
    }
  }
}

/// The next token the in-progress statement's grammar will accept.
#[derive(Clone, Copy)]
enum Expecting {
  Separator,
  Field,
  LineBreak,
}

/// A statement being accumulated, one token at a time.
struct Partial {
  header: Header,
  expecting: Expecting,
  taken: usize,
  numbers: Vec<f64>,
  corners: Vec<PolygonIndices>,
  text: Option<String>,
  line_number: usize,
  char_number: usize,
}

impl Partial {
  fn new(header: Header, line_number: usize, char_number: usize) -> Partial {
    let expecting = if header == Header::Comment {
      Expecting::LineBreak
    } else {
      Expecting::Separator
    };

    Partial {
      header,
      expecting,
      taken: 0,
      numbers: vec![],
      corners: vec![],
      text: None,
      line_number,
      char_number,
    }
  }

  /// Stores a field token's payload if it is the kind this statement
  /// takes. Returns whether the token was accepted.
  fn accept_field(&mut self, kind: &TokenKind) -> bool {
    match (self.header, kind) {
      (Header::MaterialLib, TokenKind::String(value))
      | (Header::Object, TokenKind::String(value))
      | (Header::UseMaterial, TokenKind::String(value)) => {
        self.text = Some(value.clone());
        true
      }
      (Header::Vertex, TokenKind::Number(value))
      | (Header::Normal, TokenKind::Number(value))
      | (Header::TexCoord, TokenKind::Number(value))
      | (Header::SmoothShading, TokenKind::Number(value)) => {
        self.numbers.push(*value);
        true
      }
      (Header::Face, TokenKind::Polygon(value)) => {
        self.corners.push(*value);
        true
      }
      _ => false,
    }
  }

  /// Seals the accumulated fields into a finished statement. Only called
  /// on the terminating line break, after the grammar has forced every
  /// field into place.
  fn finish(self) -> Statement {
    let Partial {
      header,
      numbers,
      corners,
      text,
      line_number,
      char_number,
      ..
    } = self;

    let kind = match header {
      Header::Comment | Header::MaterialLib | Header::Object | Header::UseMaterial => {
        let value = match text {
          Some(value) => value,
          None => unreachable!("string statements reach their line break with the field set"),
        };
        match header {
          Header::Comment => StatementKind::Comment(value),
          Header::MaterialLib => StatementKind::MaterialLib(value),
          Header::Object => StatementKind::Object(value),
          _ => StatementKind::UseMaterial(value),
        }
      }
      Header::Vertex | Header::Normal => match numbers.as_slice() {
        &[x, y, z] => {
          if header == Header::Vertex {
            StatementKind::Vertex(x, y, z)
          } else {
            StatementKind::Normal(x, y, z)
          }
        }
        _ => unreachable!("vertex statements take exactly three numbers"),
      },
      Header::TexCoord => match numbers.as_slice() {
        &[u, v] => StatementKind::TexCoord(u, v),
        _ => unreachable!("texture coordinates take exactly two numbers"),
      },
      Header::SmoothShading => match numbers.as_slice() {
        &[group] => StatementKind::SmoothShading(group),
        _ => unreachable!("smooth shading takes exactly one number"),
      },
      Header::Face => match corners.as_slice() {
        &[a, b, c] => StatementKind::Face(a, b, c),
        _ => unreachable!("faces take exactly three corners"),
      },
    };

    Statement {
      kind,
      line_number,
      char_number,
    }
  }
}

/// The statement parser. Alternates between "between statements" and a
/// per-type grammar seeded by the last header token.
pub struct Parser {
  statements: Vec<Statement>,
  partial: Option<Partial>,
}

impl Parser {
  /// Creates a parser with no statements accumulated.
  pub fn new() -> Parser {
    Parser {
      statements: vec![],
      partial: None,
    }
  }

  /// Parses the whole token sequence into statements, stopping at the
  /// first grammar violation.
  ///
  /// A statement still in progress when the tokens run out is silently
  /// dropped; everything terminated before it parses normally.
  pub fn parse_tokens(mut self, tokens: &[Token]) -> Result<Vec<Statement>, ParseError> {
    for token in tokens {
      self.process_token(token)?;
    }

    Ok(self.statements)
  }

  fn process_token(&mut self, token: &Token) -> Result<(), ParseError> {
    match self.partial.take() {
      None => self.seed_statement(token),
      Some(partial) => self.continue_statement(partial, token),
    }
  }

  fn seed_statement(&mut self, token: &Token) -> Result<(), ParseError> {
    let header = match &token.kind {
      // Whitespace between statements carries no meaning.
      TokenKind::Separator | TokenKind::LineBreak(_) => return Ok(()),
      TokenKind::Comment(text) => {
        let mut partial = Partial::new(Header::Comment, token.line_number, token.char_number);
        partial.text = Some(text.clone());
        self.partial = Some(partial);
        return Ok(());
      }
      TokenKind::MaterialLib => Header::MaterialLib,
      TokenKind::Object => Header::Object,
      TokenKind::Vertex => Header::Vertex,
      TokenKind::Normal => Header::Normal,
      TokenKind::TexCoord => Header::TexCoord,
      TokenKind::UseMaterial => Header::UseMaterial,
      TokenKind::Face => Header::Face,
      TokenKind::SmoothShading => Header::SmoothShading,
      TokenKind::Number(_) | TokenKind::String(_) | TokenKind::Polygon(_) => {
        return Err(ParseError::ExpectedStatementStart {
          kind: token.kind.name(),
          line_number: token.line_number,
          char_number: token.char_number,
        });
      }
    };

    self.partial = Some(Partial::new(header, token.line_number, token.char_number));
    Ok(())
  }

  fn continue_statement(&mut self, mut partial: Partial, token: &Token) -> Result<(), ParseError> {
    match (partial.expecting, &token.kind) {
      (Expecting::Separator, TokenKind::Separator) => {
        partial.expecting = Expecting::Field;
        self.partial = Some(partial);
        Ok(())
      }
      (Expecting::Field, kind) => {
        if !partial.accept_field(kind) {
          return Err(Parser::unexpected(token));
        }

        partial.taken += 1;
        partial.expecting = if partial.taken == partial.header.field_count() {
          Expecting::LineBreak
        } else {
          Expecting::Separator
        };
        self.partial = Some(partial);
        Ok(())
      }
      (Expecting::LineBreak, TokenKind::LineBreak(_)) => {
        self.statements.push(partial.finish());
        Ok(())
      }
      _ => Err(Parser::unexpected(token)),
    }
  }

  fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
      kind: token.kind.name(),
      line_number: token.line_number,
      char_number: token.char_number,
    }
  }
}

impl Default for Parser {
  fn default() -> Parser {
    Parser::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tok(kind: TokenKind, line_number: usize, char_number: usize) -> Token {
    Token {
      kind,
      line_number,
      char_number,
    }
  }

  fn corner(vertex: i64, texture: i64, normal: i64) -> PolygonIndices {
    PolygonIndices {
      vertex: Some(vertex),
      texture: Some(texture),
      normal: Some(normal),
    }
  }

  fn parse(tokens: Vec<Token>) -> Result<Vec<Statement>, ParseError> {
    Parser::new().parse_tokens(&tokens)
  }

  fn line_break(line_number: usize, char_number: usize) -> Token {
    tok(TokenKind::LineBreak("\n".to_string()), line_number, char_number)
  }

  #[test]
  fn parses_single_statements() {
    // (tokens, expected statement kind)
    let cases = vec![
      (
        // "# HI"
        vec![
          tok(TokenKind::Comment("# HI".to_string()), 1, 1),
          line_break(1, 5),
        ],
        StatementKind::Comment("# HI".to_string()),
      ),
      (
        // "mtllib something.mtl"
        vec![
          tok(TokenKind::MaterialLib, 1, 1),
          tok(TokenKind::Separator, 1, 7),
          tok(TokenKind::String("something.mtl".to_string()), 1, 8),
          line_break(1, 21),
        ],
        StatementKind::MaterialLib("something.mtl".to_string()),
      ),
      (
        // "o object_name"
        vec![
          tok(TokenKind::Object, 1, 1),
          tok(TokenKind::Separator, 1, 2),
          tok(TokenKind::String("object_name".to_string()), 1, 3),
          line_break(1, 14),
        ],
        StatementKind::Object("object_name".to_string()),
      ),
      (
        // "v 1.0 2.0 3.0"
        vec![
          tok(TokenKind::Vertex, 1, 1),
          tok(TokenKind::Separator, 1, 2),
          tok(TokenKind::Number(1.0), 1, 3),
          tok(TokenKind::Separator, 1, 6),
          tok(TokenKind::Number(2.0), 1, 7),
          tok(TokenKind::Separator, 1, 10),
          tok(TokenKind::Number(3.0), 1, 11),
          line_break(1, 14),
        ],
        StatementKind::Vertex(1.0, 2.0, 3.0),
      ),
      (
        // "vn 1.0 2.0 3.0"
        vec![
          tok(TokenKind::Normal, 1, 1),
          tok(TokenKind::Separator, 1, 3),
          tok(TokenKind::Number(1.0), 1, 4),
          tok(TokenKind::Separator, 1, 7),
          tok(TokenKind::Number(2.0), 1, 8),
          tok(TokenKind::Separator, 1, 11),
          tok(TokenKind::Number(3.0), 1, 12),
          line_break(1, 15),
        ],
        StatementKind::Normal(1.0, 2.0, 3.0),
      ),
      (
        // "vt 1.0 2.0"
        vec![
          tok(TokenKind::TexCoord, 1, 1),
          tok(TokenKind::Separator, 1, 3),
          tok(TokenKind::Number(1.0), 1, 4),
          tok(TokenKind::Separator, 1, 7),
          tok(TokenKind::Number(2.0), 1, 8),
          line_break(1, 11),
        ],
        StatementKind::TexCoord(1.0, 2.0),
      ),
      (
        // "usemtl name"
        vec![
          tok(TokenKind::UseMaterial, 1, 1),
          tok(TokenKind::Separator, 1, 7),
          tok(TokenKind::String("name".to_string()), 1, 8),
          line_break(1, 12),
        ],
        StatementKind::UseMaterial("name".to_string()),
      ),
      (
        // "f 1/2/3 4/5/6 7/8/9"
        vec![
          tok(TokenKind::Face, 1, 1),
          tok(TokenKind::Separator, 1, 2),
          tok(TokenKind::Polygon(corner(1, 2, 3)), 1, 3),
          tok(TokenKind::Separator, 1, 8),
          tok(TokenKind::Polygon(corner(4, 5, 6)), 1, 9),
          tok(TokenKind::Separator, 1, 14),
          tok(TokenKind::Polygon(corner(7, 8, 9)), 1, 15),
          line_break(1, 20),
        ],
        StatementKind::Face(corner(1, 2, 3), corner(4, 5, 6), corner(7, 8, 9)),
      ),
      (
        // "s 1"
        vec![
          tok(TokenKind::SmoothShading, 1, 1),
          tok(TokenKind::Separator, 1, 2),
          tok(TokenKind::Number(1.0), 1, 3),
          line_break(1, 4),
        ],
        StatementKind::SmoothShading(1.0),
      ),
    ];

    for (tokens, expected) in cases {
      let statements = parse(tokens).unwrap();

      assert_eq!(statements.len(), 1);
      assert_eq!(statements[0].kind, expected);
      assert_eq!(statements[0].line_number, 1);
      assert_eq!(statements[0].char_number, 1);
    }
  }

  #[test]
  fn parses_consecutive_statements() {
    let statements = parse(vec![
      tok(TokenKind::SmoothShading, 1, 1),
      tok(TokenKind::Separator, 1, 2),
      tok(TokenKind::Number(1.0), 1, 3),
      line_break(1, 4),
      tok(TokenKind::LineBreak("\n".to_string()), 2, 1),
      tok(TokenKind::Separator, 3, 1),
      tok(TokenKind::Object, 3, 2),
      tok(TokenKind::Separator, 3, 3),
      tok(TokenKind::String("cube".to_string()), 3, 4),
      line_break(3, 8),
    ])
    .unwrap();

    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].kind, StatementKind::SmoothShading(1.0));
    assert_eq!(statements[1].kind, StatementKind::Object("cube".to_string()));
    assert_eq!(statements[1].line_number, 3);
    assert_eq!(statements[1].char_number, 2);
  }

  #[test]
  fn rejects_a_data_token_between_statements() {
    let err = parse(vec![tok(TokenKind::Number(1.0), 2, 5)]).unwrap_err();

    assert_eq!(
      err,
      ParseError::ExpectedStatementStart {
        kind: "NUMBER",
        line_number: 2,
        char_number: 5,
      }
    );
    assert_eq!(
      err.to_string(),
      "unexpected token: NUMBER on line: 2 at: 5, expected statement start"
    );
  }

  #[test]
  fn rejects_a_field_of_the_wrong_kind() {
    let err = parse(vec![
      tok(TokenKind::Vertex, 1, 1),
      tok(TokenKind::Separator, 1, 2),
      tok(TokenKind::String("oops".to_string()), 1, 3),
    ])
    .unwrap_err();

    assert_eq!(
      err,
      ParseError::UnexpectedToken {
        kind: "STRING",
        line_number: 1,
        char_number: 3,
      }
    );
    assert_eq!(err.to_string(), "unexpected token: STRING on line: 1 at: 3");
  }

  #[test]
  fn rejects_a_missing_separator() {
    let err = parse(vec![
      tok(TokenKind::Vertex, 1, 1),
      tok(TokenKind::Number(1.0), 1, 2),
    ])
    .unwrap_err();

    assert_eq!(
      err,
      ParseError::UnexpectedToken {
        kind: "NUMBER",
        line_number: 1,
        char_number: 2,
      }
    );
  }

  #[test]
  fn rejects_too_many_fields() {
    let err = parse(vec![
      tok(TokenKind::SmoothShading, 1, 1),
      tok(TokenKind::Separator, 1, 2),
      tok(TokenKind::Number(1.0), 1, 3),
      tok(TokenKind::Separator, 1, 4),
      tok(TokenKind::Number(2.0), 1, 5),
    ])
    .unwrap_err();

    assert_eq!(
      err,
      ParseError::UnexpectedToken {
        kind: "SEPARATOR",
        line_number: 1,
        char_number: 4,
      }
    );
  }

  #[test]
  fn drops_a_trailing_unterminated_statement() {
    let statements = parse(vec![
      tok(TokenKind::SmoothShading, 1, 1),
      tok(TokenKind::Separator, 1, 2),
      tok(TokenKind::Number(1.0), 1, 3),
      line_break(1, 4),
      tok(TokenKind::Vertex, 2, 1),
      tok(TokenKind::Separator, 2, 2),
      tok(TokenKind::Number(1.0), 2, 3),
    ])
    .unwrap();

    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].kind, StatementKind::SmoothShading(1.0));
  }

  #[test]
  fn parses_an_empty_token_sequence() {
    assert!(parse(vec![]).unwrap().is_empty());
  }
}
