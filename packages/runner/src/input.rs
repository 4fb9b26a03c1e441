use std::collections::VecDeque;

use tracing::debug;

use crate::detect::ExpectedInput;
use crate::error::Result;

/// A single value the tool needs from whoever stands in for the user.
#[derive(Debug, Clone, Copy)]
pub enum InputRequest<'a> {
    /// A read call found in the source. `index` is zero-based.
    Expected {
        input: &'a ExpectedInput,
        index: usize,
        total: usize,
    },
    /// The program reads input but no read call could be located.
    OpenEnded { index: usize },
}

impl InputRequest<'_> {
    /// Human-readable prompt for this request.
    pub fn prompt_text(&self) -> String {
        match self {
            Self::Expected {
                input,
                index,
                total,
            } => match &input.prompt {
                Some(prompt) => prompt.clone(),
                None => format!(
                    "Value {} of {} ({})",
                    index + 1,
                    total,
                    input.kind.label()
                ),
            },
            Self::OpenEnded { index } => {
                format!("Input line {} (leave empty to finish)", index + 1)
            }
        }
    }
}

/// Supplies synthetic input values.
///
/// Returning `Ok(None)` declines the request: an expected input then falls
/// back to a placeholder of its kind, and open-ended collection stops.
pub trait InputProvider: Send {
    fn provide(&mut self, request: &InputRequest<'_>) -> Result<Option<String>>;
}

impl<F> InputProvider for F
where
    F: FnMut(&InputRequest<'_>) -> Result<Option<String>> + Send,
{
    fn provide(&mut self, request: &InputRequest<'_>) -> Result<Option<String>> {
        self(request)
    }
}

/// Answers from a fixed queue, then declines.
#[derive(Debug, Default)]
pub struct ScriptedInputs {
    values: VecDeque<String>,
}

impl ScriptedInputs {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl InputProvider for ScriptedInputs {
    fn provide(&mut self, _request: &InputRequest<'_>) -> Result<Option<String>> {
        Ok(self.values.pop_front())
    }
}

/// Answers every expected input with a placeholder of its kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInputs;

impl InputProvider for DefaultInputs {
    fn provide(&mut self, request: &InputRequest<'_>) -> Result<Option<String>> {
        Ok(match request {
            InputRequest::Expected { input, .. } => Some(input.kind.placeholder().to_string()),
            InputRequest::OpenEnded { .. } => None,
        })
    }
}

/// A value fed to the program together with the prompt it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppliedInput {
    pub prompt: Option<String>,
    pub value: String,
}

/// Everything fed to one program's standard input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntheticInput {
    pub supplied: Vec<SuppliedInput>,
}

impl SyntheticInput {
    pub fn is_empty(&self) -> bool {
        self.supplied.is_empty()
    }

    pub fn values(&self) -> Vec<String> {
        self.supplied.iter().map(|s| s.value.clone()).collect()
    }

    /// Newline-terminated values, ready for the process's stdin.
    pub fn to_stdin(&self) -> String {
        self.supplied
            .iter()
            .map(|s| format!("{}\n", s.value))
            .collect()
    }
}

/// Collect one value per expected input, or open-ended values when the
/// program is interactive but nothing specific was found.
pub fn synthesize(
    expected: &[ExpectedInput],
    interactive: bool,
    provider: &mut dyn InputProvider,
    max_open: usize,
) -> Result<SyntheticInput> {
    let mut supplied = Vec::with_capacity(expected.len());

    if !expected.is_empty() {
        for (index, input) in expected.iter().enumerate() {
            let request = InputRequest::Expected {
                input,
                index,
                total: expected.len(),
            };
            let value = match provider.provide(&request)? {
                Some(value) => value,
                None => {
                    debug!(index, kind = input.kind.label(), "Provider declined, using placeholder");
                    input.kind.placeholder().to_string()
                }
            };
            supplied.push(SuppliedInput {
                prompt: input.prompt.clone(),
                value,
            });
        }
    } else if interactive {
        for index in 0..max_open {
            match provider.provide(&InputRequest::OpenEnded { index })? {
                Some(value) if !value.is_empty() => supplied.push(SuppliedInput {
                    prompt: None,
                    value,
                }),
                _ => break,
            }
        }
    }

    Ok(SyntheticInput { supplied })
}
