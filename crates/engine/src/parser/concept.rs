//! Concept (`.cpt`) document parser and concept dictionary builder.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stepwright_types::{
    ArgKind, Comment, Concept, ConceptDictionary, ConceptDocument, Item, ParseError, ParseResult, Tags,
};

use super::lexer::{Token, TokenKind, tokenize};
use super::step::parse_step;
use super::{OpenTable, push_table_row};

/// Parse a concept document. Every `#` line starts a new concept whose header
/// is parsed as a step phrase.
pub fn parse_concept_document(text: &str, file_name: &Path) -> (ConceptDocument, ParseResult) {
    let mut document = ConceptDocument::new(file_name);
    let mut result = ParseResult::ok(file_name);
    let mut current: Option<Concept> = None;
    let mut previous: Option<TokenKind> = None;
    let mut open_table = OpenTable::None;

    let error = |token: &Token, message: &str| ParseError::new(token.line_no, message, token.line_text.clone()).in_file(file_name);

    for token in tokenize(text) {
        if token.kind != TokenKind::TableRow {
            open_table = OpenTable::None;
        }

        if token.kind == TokenKind::Heading {
            close_concept(&mut document, current.take(), &mut result, file_name);
            match parse_step(&token.value, token.line_no) {
                Ok(header) if header.args.iter().any(|arg| arg.kind == ArgKind::Static) => {
                    result.add_error(error(&token, "Concept heading can have only dynamic parameters"));
                }
                Ok(header) => {
                    current = Some(Concept {
                        header,
                        items: Vec::new(),
                    });
                }
                Err(parse_error) => result.add_error(parse_error.in_file(file_name)),
            }
            previous = Some(token.kind);
            continue;
        }

        match (token.kind, current.as_mut()) {
            (TokenKind::Heading, _) => {}
            (TokenKind::Comment, None) => document.preamble.push(Item::Comment(Comment {
                text: token.line_text.clone(),
                line_no: token.line_no,
            })),
            (TokenKind::ScenarioHeading, _) => {
                result.add_error(error(&token, "Scenario heading is not allowed in a concept file"));
            }
            (_, None) => {
                result.add_error(error(&token, "Concept content found before the first concept heading"));
            }
            (TokenKind::Step, Some(concept)) => match parse_step(&token.value, token.line_no) {
                Ok(step) => concept.items.push(Item::Step(step)),
                Err(parse_error) => result.add_error(parse_error.in_file(file_name)),
            },
            (TokenKind::TableRow, Some(concept)) => {
                open_table = push_table_row(&mut concept.items, &token, previous, open_table);
            }
            (TokenKind::Tags, Some(concept)) => concept.items.push(Item::Tags(Tags {
                values: token.parts.clone(),
                line_no: token.line_no,
            })),
            (TokenKind::Comment, Some(concept)) => concept.items.push(Item::Comment(Comment {
                text: token.line_text.clone(),
                line_no: token.line_no,
            })),
        }

        previous = Some(token.kind);
    }
    close_concept(&mut document, current, &mut result, file_name);

    (document, result)
}

fn close_concept(document: &mut ConceptDocument, concept: Option<Concept>, result: &mut ParseResult, file_name: &Path) {
    let Some(concept) = concept else {
        return;
    };
    if !concept.items.iter().any(|item| item.as_step().is_some()) {
        let header = &concept.header;
        result.add_error(
            ParseError::new(header.line_no, "Concept should have at least one step", header.line_text.clone()).in_file(file_name),
        );
    }
    document.concepts.push(concept);
}

/// Assemble parsed concept documents into a dictionary.
///
/// A concept header value defined more than once, in the same file or across
/// files, is an error naming both locations.
pub fn build_concept_dictionary(documents: Vec<ConceptDocument>) -> (ConceptDictionary, ParseResult) {
    let mut result = ParseResult {
        ok: true,
        ..ParseResult::default()
    };
    let mut seen: IndexMap<String, (PathBuf, usize)> = IndexMap::new();

    for document in &documents {
        for concept in &document.concepts {
            let key = concept.header.value.trim().to_string();
            match seen.get(&key) {
                Some((first_file, first_line)) => {
                    let message = format!(
                        "Duplicate concept definition found, first defined at {}:{}",
                        first_file.display(),
                        first_line
                    );
                    result.add_error(
                        ParseError::new(concept.header.line_no, message, concept.header.line_text.clone())
                            .in_file(&document.file_name),
                    );
                }
                None => {
                    seen.insert(key, (document.file_name.clone(), concept.header.line_no));
                }
            }
        }
    }

    (ConceptDictionary { documents }, result)
}
