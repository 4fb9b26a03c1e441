//! Interleaves supplied input values with captured output.
//!
//! Standard input is not echoed when it comes from a pipe, so prompts run
//! together in the captured text. This rewrites the output so each prompt
//! is followed by a `User entered: <value>` line. Purely textual; it may
//! misalign with what the program actually did.

use std::sync::LazyLock;

use regex::Regex;

use crate::compile;
use crate::input::{SuppliedInput, SyntheticInput};

const PRINTF_CONVERSION: &str = r"%[-+#0]*\d*(?:\.\d+)?(?:hh|h|ll|l|L)?[diufFeEgGcs]";

/// Conversions left unformatted in captured output. Braces are not
/// included because literal `{}` is ordinary program text.
static FORMAT_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(PRINTF_CONVERSION));

/// Holes in a prompt literal: printf conversions plus `{}` / `{name}`
/// interpolation slots from format strings and f-strings.
static PROMPT_HOLE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"{PRINTF_CONVERSION}|\{{[^}}]*\}}")));

const ECHO_PREFIX: &str = "User entered: ";

/// Rewrite `output` to show where each supplied value went.
pub fn reconcile(output: &str, input: &SyntheticInput) -> String {
    if input.is_empty() {
        return output.to_string();
    }

    let values = input.values();
    let matchers: Vec<Option<Regex>> = input.supplied.iter().map(prompt_matcher).collect();
    let mut token_index = 0;
    let mut next = 0;
    let mut lines = Vec::new();

    for raw in output.lines() {
        let line = substitute_tokens(raw, &values, &mut token_index);
        let mut rest = line.as_str();
        let mut emitted = false;

        while next < input.supplied.len() {
            match &matchers[next] {
                Some(matcher) => {
                    let Some(found) = matcher.find(rest) else {
                        break;
                    };
                    let (head, tail) = rest.split_at(found.end());
                    lines.push(head.trim_end().to_string());
                    echo(&mut lines, &input.supplied[next]);
                    next += 1;
                    while next < input.supplied.len() && matchers[next].is_none() {
                        echo(&mut lines, &input.supplied[next]);
                        next += 1;
                    }
                    rest = tail.trim_start();
                    emitted = true;
                }
                None => {
                    if looks_like_prompt(rest) {
                        lines.push(rest.to_string());
                        echo(&mut lines, &input.supplied[next]);
                        next += 1;
                        rest = "";
                        emitted = true;
                    }
                    break;
                }
            }
        }

        if !rest.is_empty() || !emitted {
            lines.push(rest.to_string());
        }
    }

    let mut result = lines.join("\n");
    if output.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn echo(lines: &mut Vec<String>, supplied: &SuppliedInput) {
    lines.push(format!("{ECHO_PREFIX}{}", supplied.value));
}

/// Regex for a prompt literal. Holes inside it match anything.
fn prompt_matcher(supplied: &SuppliedInput) -> Option<Regex> {
    let prompt = supplied.prompt.as_deref()?.trim();
    if prompt.is_empty() {
        return None;
    }
    let mut pattern = String::new();
    let mut last = 0;
    for token in PROMPT_HOLE.find_iter(prompt) {
        pattern.push_str(&regex::escape(&prompt[last..token.start()]));
        pattern.push_str(".*?");
        last = token.end();
    }
    pattern.push_str(&regex::escape(&prompt[last..]));
    Regex::new(&pattern).ok()
}

fn substitute_tokens(line: &str, values: &[String], index: &mut usize) -> String {
    if !FORMAT_TOKEN.is_match(line) {
        return line.to_string();
    }
    FORMAT_TOKEN
        .replace_all(line, |caps: &regex::Captures<'_>| match values.get(*index) {
            Some(value) => {
                *index += 1;
                value.clone()
            }
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn looks_like_prompt(line: &str) -> bool {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.ends_with([':', '?', '>']) || trimmed.to_lowercase().contains("enter")
}
