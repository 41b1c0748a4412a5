//! Runner-facing step value extraction.

use stepwright_types::{Fragment, ParseError, StepValue, TABLE_PARAMETER};

use crate::parser::parse_step;

/// Extract the runner's normalized view of a step phrase.
///
/// `has_inline_table` appends one more placeholder for the table argument.
pub fn extract_step_value(text: &str, has_inline_table: bool) -> Result<StepValue, ParseError> {
    let step = parse_step(text, 0)?;

    let mut step_value = step.value;
    let mut parameterized_step_value = step
        .fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Text(text) => text.clone(),
            Fragment::Parameter(arg) => format!("<{}>", arg.value),
        })
        .collect::<String>()
        .trim()
        .to_string();
    let mut parameters: Vec<String> = step.args.into_iter().map(|arg| arg.value).collect();

    if has_inline_table {
        step_value.push_str(" {}");
        parameterized_step_value.push_str(&format!(" <{TABLE_PARAMETER}>"));
        parameters.push(TABLE_PARAMETER.to_string());
    }

    Ok(StepValue {
        step_value,
        parameterized_step_value,
        parameters,
    })
}
