//! Step phrase parsing.

use stepwright_types::{Fragment, ParseError, STEP_VALUE_PLACEHOLDER, Step, StepArg};

/// Parse a step phrase (the text after `*`) into a [`Step`].
///
/// `"..."` delimits a static argument (`\"` escapes a quote) and `<...>` a
/// dynamic one; a backslash not followed by `"` is kept verbatim. The
/// normalized value replaces each argument with `{}`.
pub fn parse_step(text: &str, line_no: usize) -> Result<Step, ParseError> {
    let phrase = text.trim();
    if phrase.is_empty() {
        return Err(ParseError::new(line_no, "Step should not be blank", text));
    }

    let mut fragments = Vec::new();
    let mut literal = String::new();
    let mut chars = phrase.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let value = read_static(&mut chars)
                    .ok_or_else(|| ParseError::new(line_no, "String not terminated", phrase))?;
                push_literal(&mut fragments, &mut literal);
                fragments.push(Fragment::Parameter(StepArg::new_static(value)));
            }
            '<' => {
                let value = read_dynamic(&mut chars)
                    .ok_or_else(|| ParseError::new(line_no, "Dynamic parameter not terminated with '>'", phrase))?;
                if value.trim().is_empty() {
                    return Err(ParseError::new(line_no, "Dynamic parameter name should not be blank", phrase));
                }
                push_literal(&mut fragments, &mut literal);
                fragments.push(Fragment::Parameter(StepArg::new_dynamic(value)));
            }
            _ => literal.push(c),
        }
    }
    push_literal(&mut fragments, &mut literal);

    let args = fragments
        .iter()
        .filter_map(|fragment| match fragment {
            Fragment::Parameter(arg) => Some(arg.clone()),
            Fragment::Text(_) => None,
        })
        .collect();
    let value = fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Text(text) => text.as_str(),
            Fragment::Parameter(_) => STEP_VALUE_PLACEHOLDER,
        })
        .collect::<String>()
        .trim()
        .to_string();

    Ok(Step {
        value,
        line_text: phrase.to_string(),
        line_no,
        args,
        fragments,
        inline_table: None,
    })
}

fn push_literal(fragments: &mut Vec<Fragment>, literal: &mut String) {
    if !literal.is_empty() {
        fragments.push(Fragment::Text(std::mem::take(literal)));
    }
}

fn read_static(chars: &mut std::str::Chars<'_>) -> Option<String> {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(value),
            '\\' if chars.clone().next() == Some('"') => {
                chars.next();
                value.push('"');
            }
            _ => value.push(c),
        }
    }
    None
}

fn read_dynamic(chars: &mut std::str::Chars<'_>) -> Option<String> {
    let mut value = String::new();
    for c in chars.by_ref() {
        if c == '>' {
            return Some(value);
        }
        value.push(c);
    }
    None
}
