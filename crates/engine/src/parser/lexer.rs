//! Line tokenizer for the spec language.
//!
//! Each non-blank line becomes exactly one [`Token`]. Interpretation of the
//! token stream (which heading owns which step, where a table belongs) is left
//! to the document parsers.

/// Kind of a tokenized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `# text`
    Heading,
    /// `## text`
    ScenarioHeading,
    /// `* text`
    Step,
    /// `|a|b|`
    TableRow,
    /// `tags: a, b`
    Tags,
    /// Any other line.
    Comment,
}

/// A single tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Line content without its marker, trimmed.
    pub value: String,
    /// Table cells for [`TokenKind::TableRow`], tag values for [`TokenKind::Tags`].
    pub parts: Vec<String>,
    /// Original line, trimmed.
    pub line_text: String,
    /// 1-based line number.
    pub line_no: usize,
    /// Whether at least one blank line separates this token from the previous one.
    pub after_blank: bool,
}

/// Tokenize a document.
///
/// Markdown table separator rows (`|---|---|`) carry no data and are dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut after_blank = false;

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            after_blank = true;
            continue;
        }

        let (kind, value, parts) = classify(line);
        if kind == TokenKind::TableRow && is_separator_row(&parts) {
            continue;
        }
        tokens.push(Token {
            kind,
            value,
            parts,
            line_text: line.to_string(),
            line_no: index + 1,
            after_blank: after_blank && !tokens.is_empty(),
        });
        after_blank = false;
    }

    tokens
}

fn classify(line: &str) -> (TokenKind, String, Vec<String>) {
    if let Some(rest) = line.strip_prefix("##") {
        if !rest.starts_with('#') {
            return (TokenKind::ScenarioHeading, rest.trim().to_string(), Vec::new());
        }
        return (TokenKind::Comment, line.to_string(), Vec::new());
    }
    if let Some(rest) = line.strip_prefix('#') {
        return (TokenKind::Heading, rest.trim().to_string(), Vec::new());
    }
    if let Some(rest) = line.strip_prefix('*') {
        return (TokenKind::Step, rest.trim().to_string(), Vec::new());
    }
    if line.starts_with('|') {
        return (TokenKind::TableRow, line.to_string(), split_cells(line));
    }
    if let Some(prefix) = line.get(..5)
        && prefix.eq_ignore_ascii_case("tags:")
    {
        let values = line[5..]
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        return (TokenKind::Tags, line[5..].trim().to_string(), values);
    }
    (TokenKind::Comment, line.to_string(), Vec::new())
}

fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'))
}
