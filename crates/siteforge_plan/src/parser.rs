//! Plan extraction from raw model output.
//!
//! Ordered recovery strategies, first success wins:
//! 1. a fenced block explicitly labeled `json`
//! 2. any fenced block
//! 3. the first balanced top-level `{...}` span that parses, found by a
//!    character scan that tracks quoted-string state so braces inside
//!    string literals don't count as nesting boundaries
//! 4. the entire trimmed text

use tracing::debug;

use crate::error::{PlanError, PlanResult};
use crate::model::Plan;

/// Extract a [`Plan`] from raw generative-model output.
pub fn parse_plan(raw: &str) -> PlanResult<Plan> {
    let blocks = fenced_blocks(raw);

    for (label, body) in &blocks {
        if label == "json" {
            if let Ok(plan) = try_parse(body) {
                debug!("Plan recovered from labeled fence");
                return Ok(plan);
            }
        }
    }

    for (_, body) in &blocks {
        if let Ok(plan) = try_parse(body) {
            debug!("Plan recovered from unlabeled fence");
            return Ok(plan);
        }
    }

    for span in balanced_object_spans(raw) {
        if let Ok(plan) = try_parse(span) {
            debug!("Plan recovered from embedded object span");
            return Ok(plan);
        }
    }

    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        if let Ok(plan) = try_parse(trimmed) {
            return Ok(plan);
        }
    }

    Err(PlanError::UnparsableResponse)
}

fn try_parse(text: &str) -> Result<Plan, serde_json::Error> {
    serde_json::from_str(text.trim())
}

/// All fenced blocks in order, as (lowercased label, body) pairs.
fn fenced_blocks(raw: &str) -> Vec<(String, &str)> {
    let mut blocks = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let Some(label_end) = after.find('\n') else {
            break;
        };
        let label = after[..label_end].trim().to_lowercase();
        let body = &after[label_end + 1..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push((label, &body[..close]));
        rest = &body[close + 3..];
    }

    blocks
}

/// Balanced top-level `{...}` spans, skipping braces inside string
/// literals (including escaped quotes).
fn balanced_object_spans(raw: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            // Quotes only delimit strings inside a candidate span; prose
            // quotes outside braces produce spans that simply fail to parse.
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            spans.push(&raw[s..=i]);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labeled_fence() {
        let raw = "Here is your project:\n```json\n{\"files\": {\"app/page.tsx\": \"x\"}}\n```\nEnjoy!";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.files.get("app/page.tsx").unwrap(), "x");
    }

    #[test]
    fn parses_unlabeled_fence() {
        let raw = "```\n{\"dependencies\": {\"axios\": \"^1.0.0\"}}\n```";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.dependencies.get("axios").unwrap(), "^1.0.0");
    }

    #[test]
    fn labeled_fence_beats_earlier_unlabeled_fence() {
        let raw = "```\nnot a plan\n```\n```json\n{\"commands\": [\"npm test\"]}\n```";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.commands, vec!["npm test"]);
    }

    #[test]
    fn recovers_object_embedded_in_prose() {
        let raw = "Sure! I generated the app. {\"files\": {\"a.txt\": \"hello\"}} Let me know.";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.files.get("a.txt").unwrap(), "hello");
    }

    #[test]
    fn braces_inside_string_literals_do_not_break_the_scan() {
        let raw = r#"The plan: {"files": {"style.css": "body { color: red; }"}} done."#;
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.files.get("style.css").unwrap(), "body { color: red; }");
    }

    #[test]
    fn escaped_quotes_inside_strings_are_handled() {
        let raw = r#"Output: {"files": {"a.js": "console.log(\"{nested}\")"}} end"#;
        let plan = parse_plan(raw).unwrap();
        assert_eq!(
            plan.files.get("a.js").unwrap(),
            r#"console.log("{nested}")"#
        );
    }

    #[test]
    fn skips_unparsable_spans_before_the_real_payload() {
        let raw = "some {not json} prose {\"delete\": [\"old.txt\"]}";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.delete, vec!["old.txt"]);
    }

    #[test]
    fn parses_bare_trimmed_text() {
        let raw = "  \n {\"files\": {}} \n ";
        assert!(parse_plan(raw).is_ok());
    }

    #[test]
    fn empty_input_is_unparsable() {
        assert!(matches!(
            parse_plan("   \n  "),
            Err(PlanError::UnparsableResponse)
        ));
    }

    #[test]
    fn prose_without_payload_is_unparsable() {
        assert!(matches!(
            parse_plan("I could not generate a plan for that request."),
            Err(PlanError::UnparsableResponse)
        ));
    }

    #[test]
    fn recovered_payload_round_trips_exactly() {
        let payload = r#"{"files":{"a.txt":"x"},"delete":["b.txt"],"dependencies":{"next":"14.2.3"},"commands":["npm run dev"]}"#;
        let raw = format!("prefix prose {} suffix prose", payload);
        let plan = parse_plan(&raw).unwrap();
        let direct: Plan = serde_json::from_str(payload).unwrap();
        assert_eq!(plan, direct);
    }

    #[test]
    fn unterminated_fence_falls_through_to_scan() {
        let raw = "```json\n{\"files\": {\"a.txt\": \"x\"}}";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.files.get("a.txt").unwrap(), "x");
    }
}
