//! Heuristic detection of console input in source text.
//!
//! Everything here is regex matching over raw lines, so reads that sit inside
//! comments or string literals are reported as well. Callers only depend on
//! [`SourceScanner`], which keeps the regexes replaceable.

mod rules;

use crate::language::Language;
use rules::Rules;

/// What sort of value a read call expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Integer,
    Decimal,
    Character,
    Text,
}

impl InputKind {
    /// Classify a printf/scanf conversion character.
    pub fn from_conversion(conv: char) -> Option<Self> {
        match conv {
            'd' | 'i' | 'u' | 'o' | 'x' | 'X' => Some(Self::Integer),
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'a' | 'A' => Some(Self::Decimal),
            'c' => Some(Self::Character),
            's' | '[' => Some(Self::Text),
            _ => None,
        }
    }

    /// A plausible value of this kind.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Integer => "5",
            Self::Decimal => "2.5",
            Self::Character => "a",
            Self::Text => "test",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Character => "character",
            Self::Text => "text",
        }
    }
}

/// One value the program is expected to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedInput {
    /// Prompt recovered from the source, if any.
    pub prompt: Option<String>,
    pub kind: InputKind,
}

impl ExpectedInput {
    pub fn new(prompt: Option<&str>, kind: InputKind) -> Self {
        Self {
            prompt: prompt.map(str::to_string),
            kind,
        }
    }
}

/// Decides whether a program reads standard input and what it asks for.
pub trait SourceScanner: Send + Sync {
    /// Whether the source contains the language's console-read idiom.
    fn is_interactive(&self, source: &str) -> bool;

    /// Expected inputs in source order.
    fn expected_inputs(&self, source: &str) -> Vec<ExpectedInput>;
}

/// Regex-backed scanner for one language.
pub struct RegexScanner {
    rules: &'static Rules,
}

impl RegexScanner {
    /// `None` for languages that are never executed.
    pub fn for_language(language: Language) -> Option<Self> {
        rules::for_language(language).map(|rules| Self { rules })
    }
}

impl SourceScanner for RegexScanner {
    fn is_interactive(&self, source: &str) -> bool {
        self.rules.interactive.is_match(source)
    }

    fn expected_inputs(&self, source: &str) -> Vec<ExpectedInput> {
        let declared = (self.rules.declarations)(source);
        // Most recent printed literal not yet claimed by a read.
        let mut pending: Option<String> = None;
        let mut inputs = Vec::new();

        for line in source.lines() {
            let prints = rules::print_literals(self.rules, line);
            let mut printed = prints.into_iter().peekable();

            for read in (self.rules.reads)(line, &declared) {
                while let Some((_, text)) = printed.next_if(|(pos, _)| *pos < read.start) {
                    pending = Some(text);
                }
                let prompt = match read.prompt {
                    Some(literal) => {
                        pending = None;
                        Some(literal)
                    }
                    None => pending.take(),
                };
                for (i, kind) in read.kinds.into_iter().enumerate() {
                    inputs.push(ExpectedInput {
                        prompt: if i == 0 { prompt.clone() } else { None },
                        kind,
                    });
                }
            }

            if let Some((_, text)) = printed.last() {
                pending = Some(text);
            }
        }

        inputs
    }
}
