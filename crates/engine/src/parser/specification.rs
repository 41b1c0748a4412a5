//! Specification (`.spec`) document parser.

use std::path::Path;

use stepwright_types::{Comment, Heading, Item, ParseError, ParseResult, Scenario, Specification, Tags, Warning};

use super::lexer::{Token, TokenKind, tokenize};
use super::step::parse_step;
use super::{OpenTable, push_table_row};

/// Parse a specification document.
///
/// The returned specification holds everything that could be parsed even when
/// the result reports errors.
pub fn parse_specification(text: &str, file_name: &Path) -> (Specification, ParseResult) {
    let mut builder = SpecificationBuilder::new(file_name);
    for token in tokenize(text) {
        builder.accept(&token);
    }
    builder.finish()
}

struct SpecificationBuilder<'a> {
    file_name: &'a Path,
    spec: Specification,
    scenario: Option<Scenario>,
    result: ParseResult,
    previous: Option<TokenKind>,
    open_table: OpenTable,
}

impl<'a> SpecificationBuilder<'a> {
    fn new(file_name: &'a Path) -> Self {
        Self {
            file_name,
            spec: Specification::new(file_name),
            scenario: None,
            result: ParseResult::ok(file_name),
            previous: None,
            open_table: OpenTable::None,
        }
    }

    fn items(&mut self) -> &mut Vec<Item> {
        match self.scenario.as_mut() {
            Some(scenario) => &mut scenario.items,
            None if self.spec.heading.is_none() => &mut self.spec.preamble,
            None => &mut self.spec.items,
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        let error = ParseError::new(token.line_no, message, token.line_text.clone()).in_file(self.file_name);
        self.result.add_error(error);
    }

    fn warn(&mut self, line_no: usize, message: impl Into<String>) {
        self.result.add_warning(Warning {
            file_name: self.file_name.to_path_buf(),
            line_no,
            message: message.into(),
        });
    }

    fn accept(&mut self, token: &Token) {
        if token.kind != TokenKind::TableRow {
            self.open_table = OpenTable::None;
        }

        match token.kind {
            TokenKind::Heading => {
                if self.spec.heading.is_some() {
                    self.error(token, "Multiple specification headings found in same file");
                } else {
                    self.spec.heading = Some(Heading {
                        text: token.value.clone(),
                        line_no: token.line_no,
                    });
                }
            }
            TokenKind::ScenarioHeading => {
                if self.spec.heading.is_none() {
                    self.error(token, "Scenario should be defined after the specification heading");
                } else {
                    self.close_scenario();
                    self.scenario = Some(Scenario {
                        heading: Heading {
                            text: token.value.clone(),
                            line_no: token.line_no,
                        },
                        items: Vec::new(),
                    });
                }
            }
            TokenKind::Step => {
                if self.spec.heading.is_none() {
                    self.error(token, "Step should be defined after the specification heading");
                } else {
                    match parse_step(&token.value, token.line_no) {
                        Ok(step) => self.items().push(Item::Step(step)),
                        Err(error) => self.result.add_error(error.in_file(self.file_name)),
                    }
                }
            }
            TokenKind::TableRow => {
                let previous = self.previous;
                let open = self.open_table;
                self.open_table = push_table_row(self.items(), token, previous, open);
            }
            TokenKind::Tags => {
                let tags = Tags {
                    values: token.parts.clone(),
                    line_no: token.line_no,
                };
                self.items().push(Item::Tags(tags));
            }
            TokenKind::Comment => {
                let comment = Comment {
                    text: token.line_text.clone(),
                    line_no: token.line_no,
                };
                self.items().push(Item::Comment(comment));
            }
        }

        self.previous = Some(token.kind);
    }

    fn close_scenario(&mut self) {
        if let Some(scenario) = self.scenario.take() {
            if !scenario.items.iter().any(|item| item.as_step().is_some()) {
                self.warn(
                    scenario.heading.line_no,
                    format!("Scenario '{}' should have at least one step", scenario.heading.text),
                );
            }
            self.spec.scenarios.push(scenario);
        }
    }

    fn finish(mut self) -> (Specification, ParseResult) {
        self.close_scenario();
        match self.spec.heading.as_ref().map(|heading| heading.line_no) {
            None => {
                let error = ParseError::new(1, "Specification heading not found", "").in_file(self.file_name);
                self.result.add_error(error);
            }
            Some(line_no) if self.spec.scenarios.is_empty() => {
                self.warn(line_no, "Specification should have at least one scenario");
            }
            Some(_) => {}
        }
        (self.spec, self.result)
    }
}
