//! Derives importer results from the statement sequence.
use crate::parse::{Statement, StatementKind};

/// Folds a statement sequence into the data the importer cares about.
///
/// Today that is just the ordered list of material library references.
/// The geometry statements are accepted untouched; they are the contract
/// surface for a mesh builder to consume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Processor {
  material_files: Vec<String>,
}

impl Processor {
  /// Creates a processor with nothing collected yet.
  pub fn new() -> Processor {
    Processor::default()
  }

  /// Folds every statement, in order, into the collected results. The
  /// statements themselves are left untouched.
  pub fn process_statements(&mut self, statements: &[Statement]) {
    for statement in statements {
      self.process_statement(statement);
    }
  }

  /// Every `mtllib` file name seen so far, in encounter order, duplicates
  /// preserved.
  pub fn material_files(&self) -> &[String] {
    &self.material_files
  }

  fn process_statement(&mut self, statement: &Statement) {
    if let StatementKind::MaterialLib(file_name) = &statement.kind {
      self.material_files.push(file_name.clone());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn material_lib(file_name: &str, line_number: usize) -> Statement {
    Statement {
      kind: StatementKind::MaterialLib(file_name.to_string()),
      line_number,
      char_number: 1,
    }
  }

  #[test]
  fn collects_material_files_in_encounter_order() {
    let statements = vec![
      material_lib("a.mtl", 1),
      Statement {
        kind: StatementKind::Vertex(0.0, 1.0, 2.0),
        line_number: 2,
        char_number: 1,
      },
      material_lib("b.mtl", 3),
    ];

    let mut processor = Processor::new();
    processor.process_statements(&statements);

    assert_eq!(processor.material_files(), ["a.mtl", "b.mtl"]);
  }

  #[test]
  fn preserves_duplicate_references() {
    let statements = vec![material_lib("a.mtl", 1), material_lib("a.mtl", 2)];

    let mut processor = Processor::new();
    processor.process_statements(&statements);

    assert_eq!(processor.material_files(), ["a.mtl", "a.mtl"]);
  }

  #[test]
  fn collects_nothing_without_material_libs() {
    let statements = vec![Statement {
      kind: StatementKind::SmoothShading(1.0),
      line_number: 1,
      char_number: 1,
    }];

    let mut processor = Processor::new();
    processor.process_statements(&statements);

    assert!(processor.material_files().is_empty());
  }

  #[test]
  fn reprocessing_the_same_statements_gives_identical_results() {
    let statements = vec![material_lib("a.mtl", 1), material_lib("b.mtl", 2)];

    let mut first = Processor::new();
    first.process_statements(&statements);

    let mut second = Processor::new();
    second.process_statements(&statements);

    assert_eq!(first, second);
    assert_eq!(statements.len(), 2);
  }
}
