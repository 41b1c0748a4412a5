//! Spec-language parsing.
//!
//! [`lexer`] turns a document into line tokens; [`specification`] and
//! [`concept`] assemble those tokens into the document model, and [`step`]
//! handles a single step phrase. Parsers never fail outright: fatal problems are
//! collected in the returned [`ParseResult`](stepwright_types::ParseResult) next
//! to whatever could be built.

pub mod concept;
pub mod lexer;
pub mod specification;
pub mod step;

pub use concept::{build_concept_dictionary, parse_concept_document};
pub use lexer::{Token, TokenKind, tokenize};
pub use specification::parse_specification;
pub use step::parse_step;

use stepwright_types::{Item, Table};

/// Tracks which table, if any, the next row continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum OpenTable {
    #[default]
    None,
    Inline,
    Standalone,
}

/// Place a table row into `items`.
///
/// A row directly below a step (no blank line) opens that step's inline table,
/// which also becomes the step's last argument;
/// a row directly below another row continues the open table; any other row
/// starts a standalone table item.
pub(crate) fn push_table_row(items: &mut Vec<Item>, token: &Token, previous: Option<TokenKind>, open: OpenTable) -> OpenTable {
    let adjacent = !token.after_blank;
    let cells = token.parts.clone();

    if adjacent && previous == Some(TokenKind::TableRow) {
        match (open, items.last_mut()) {
            (OpenTable::Inline, Some(Item::Step(step))) => {
                if let Some(table) = step.inline_table.as_mut() {
                    table.rows.push(cells);
                    return OpenTable::Inline;
                }
            }
            (OpenTable::Standalone, Some(Item::Table(table))) => {
                table.rows.push(cells);
                return OpenTable::Standalone;
            }
            _ => {}
        }
    }

    if adjacent
        && previous == Some(TokenKind::Step)
        && let Some(Item::Step(step)) = items.last_mut()
    {
        step.attach_inline_table(Table {
            headers: cells,
            rows: Vec::new(),
            line_no: token.line_no,
        });
        return OpenTable::Inline;
    }

    items.push(Item::Table(Table {
        headers: cells,
        rows: Vec::new(),
        line_no: token.line_no,
    }));
    OpenTable::Standalone
}
