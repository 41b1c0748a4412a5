//! Canonical text rendering of documents.
//!
//! Output is organized in blocks separated by one blank line: every heading,
//! table and tags line is a block of its own while runs of consecutive steps or
//! consecutive comments stay together. Inline tables follow their step,
//! indented by three spaces.

use stepwright_types::{ConceptDocument, Item, Specification, Table};

const INLINE_TABLE_INDENT: &str = "   ";

/// Render a specification.
pub fn format_specification(spec: &Specification) -> String {
    let mut blocks = Vec::new();
    push_item_blocks(&mut blocks, &spec.preamble);
    if let Some(heading) = &spec.heading {
        blocks.push(format!("# {}", heading.text));
    }
    push_item_blocks(&mut blocks, &spec.items);
    for scenario in &spec.scenarios {
        blocks.push(format!("## {}", scenario.heading.text));
        push_item_blocks(&mut blocks, &scenario.items);
    }
    join_blocks(blocks)
}

/// Render every concept of a concept document, in definition order.
pub fn format_concept_document(document: &ConceptDocument) -> String {
    let mut blocks = Vec::new();
    push_item_blocks(&mut blocks, &document.preamble);
    for concept in &document.concepts {
        blocks.push(format!("# {}", concept.header.render_text()));
        push_item_blocks(&mut blocks, &concept.items);
    }
    join_blocks(blocks)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Steps,
    Comments,
    Table,
    Tags,
}

impl BlockKind {
    fn of(item: &Item) -> Self {
        match item {
            Item::Step(_) => Self::Steps,
            Item::Comment(_) => Self::Comments,
            Item::Table(_) => Self::Table,
            Item::Tags(_) => Self::Tags,
        }
    }

    fn groups(self) -> bool {
        matches!(self, Self::Steps | Self::Comments)
    }
}

fn push_item_blocks(blocks: &mut Vec<String>, items: &[Item]) {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<BlockKind> = None;

    for item in items {
        let kind = BlockKind::of(item);
        if current.is_some_and(|open| open != kind || !kind.groups()) {
            blocks.push(lines.join("\n"));
            lines.clear();
        }
        render_item(item, &mut lines);
        current = Some(kind);
    }

    if !lines.is_empty() {
        blocks.push(lines.join("\n"));
    }
}

fn render_item(item: &Item, lines: &mut Vec<String>) {
    match item {
        Item::Step(step) => {
            lines.push(format!("* {}", step.render_text()));
            if let Some(table) = &step.inline_table {
                lines.extend(
                    render_table(table)
                        .into_iter()
                        .map(|line| format!("{INLINE_TABLE_INDENT}{line}")),
                );
            }
        }
        Item::Comment(comment) => lines.push(comment.text.clone()),
        Item::Table(table) => lines.extend(render_table(table)),
        Item::Tags(tags) => lines.push(format!("tags: {}", tags.values.join(", "))),
    }
}

/// Render a table with padded columns and a separator row below the headers.
pub fn render_table(table: &Table) -> Vec<String> {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);

    let cell = |row: &[String], column: usize| row.get(column).map(String::as_str).unwrap_or("").to_string();
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            std::iter::once(&table.headers)
                .chain(table.rows.iter())
                .map(|row| cell(row, column).chars().count())
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    let render_row = |row: &[String]| {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, width)| format!("{:<width$}", cell(row, column), width = width))
            .collect();
        format!("|{}|", cells.join("|"))
    };

    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let mut lines = vec![render_row(&table.headers), format!("|{}|", separator.join("|"))];
    lines.extend(table.rows.iter().map(|row| render_row(row)));
    lines
}

fn join_blocks(blocks: Vec<String>) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let mut text = blocks.join("\n\n");
    text.push('\n');
    text
}
