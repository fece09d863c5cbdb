//! Parsing of ReAct-formatted model output

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const FINAL_ANSWER: &str = "Final Answer:";
const OBSERVATION: &str = "Observation:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Finish(String),
}

/// Parse one model reply into the next step
///
/// The error is a short reason suitable for feeding back to the model.
pub fn parse_step(text: &str) -> Result<AgentStep, String> {
    let action = parse_action(text)?;
    let final_answer = text
        .find(FINAL_ANSWER)
        .map(|idx| text[idx + FINAL_ANSWER.len()..].trim().to_string());

    match (action, final_answer) {
        (Some(_), Some(_)) => Err(format!(
            "Reply contains both an '{}' and a '{}'; give only one",
            ACTION, FINAL_ANSWER
        )),
        (Some((tool, input)), None) => Ok(AgentStep::Action { tool, input }),
        (None, Some(answer)) => Ok(AgentStep::Finish(answer)),
        (None, None) => Err(format!(
            "Missing '{}' or '{}' after 'Thought:'",
            ACTION, FINAL_ANSWER
        )),
    }
}

fn parse_action(text: &str) -> Result<Option<(String, String)>, String> {
    let Some(action_idx) = find_line_prefix(text, ACTION) else {
        return Ok(None);
    };
    let after_action = &text[action_idx + ACTION.len()..];

    let tool = after_action.lines().next().unwrap_or_default().trim().to_string();
    if tool.is_empty() {
        return Err(format!("'{}' names no tool", ACTION));
    }

    let Some(input_idx) = after_action.find(ACTION_INPUT) else {
        return Err(format!("Missing '{}' after '{}'", ACTION_INPUT, ACTION));
    };
    let mut input = &after_action[input_idx + ACTION_INPUT.len()..];
    if let Some(end) = input.find(OBSERVATION) {
        input = &input[..end];
    }
    if let Some(end) = input.find(FINAL_ANSWER) {
        input = &input[..end];
    }

    Ok(Some((tool, input.trim().to_string())))
}

/// Byte offset of the first line that starts with `prefix` (after indentation)
fn find_line_prefix(text: &str, prefix: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(prefix) {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}
