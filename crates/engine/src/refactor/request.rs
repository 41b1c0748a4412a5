//! Building the runner's refactor request.

use stepwright_types::{Fragment, ParseError, RefactorRequest, Step, StepArg};

use super::order::OrderMap;
use crate::step_value::extract_step_value;

/// Phrase of the new step with the implementation's parameter names
/// substituted at their mapped positions.
///
/// `old_parameters` are the parameters of the implementation's current step
/// name. A new parameter without an old counterpart keeps its own text.
pub fn generate_new_step_name(new: &Step, old_parameters: &[String], order: &OrderMap) -> String {
    let mut position = 0;
    new.fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Text(text) => text.clone(),
            Fragment::Parameter(arg) => {
                let mapped = order.old_position(position).and_then(|old| old_parameters.get(old));
                position += 1;
                match mapped {
                    Some(value) => StepArg {
                        kind: arg.kind,
                        value: value.clone(),
                    }
                    .render(),
                    None => arg.render(),
                }
            }
        })
        .collect()
}

/// Request asking the runner to rename `step_name` to the new phrase.
pub fn build_refactor_request(step_name: &str, new: &Step, order: &OrderMap) -> Result<RefactorRequest, ParseError> {
    let old_step_value = extract_step_value(step_name, false)?;
    let new_step_name = generate_new_step_name(new, &old_step_value.parameters, order);
    let new_step_value = extract_step_value(&new_step_name, false)?;

    Ok(RefactorRequest {
        old_step_value,
        new_step_value,
        param_positions: order.parameter_positions(),
    })
}
