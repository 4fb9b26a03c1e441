use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::InputKind;
use crate::compile;
use crate::language::Language;

/// Variable name -> kind, from declarations in the source.
pub(super) type Declarations = HashMap<String, InputKind>;

/// A read call found on one line.
pub(super) struct Read {
    /// Byte offset of the call within the line.
    pub start: usize,
    /// Prompt passed to the call itself.
    pub prompt: Option<String>,
    /// One entry per value consumed by the call.
    pub kinds: Vec<InputKind>,
}

pub(super) struct Rules {
    pub interactive: LazyLock<Regex>,
    /// Print calls whose first capture group holding a match is the literal.
    pub print: LazyLock<Regex>,
    pub reads: fn(&str, &Declarations) -> Vec<Read>,
    pub declarations: fn(&str) -> Declarations,
}

pub(super) fn for_language(language: Language) -> Option<&'static Rules> {
    match language {
        Language::Python => Some(&PYTHON),
        Language::C => Some(&C),
        Language::Cpp => Some(&CPP),
        Language::Java => Some(&JAVA),
        Language::JavaScript => Some(&JAVASCRIPT),
        Language::Php => Some(&PHP),
        Language::Html | Language::Css => None,
    }
}

/// Printed literals on `line` with their offsets.
pub(super) fn print_literals(rules: &Rules, line: &str) -> Vec<(usize, String)> {
    rules
        .print
        .captures_iter(line)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let raw = caps.iter().skip(1).flatten().next()?;
            clean_literal(raw.as_str()).map(|text| (start, text))
        })
        .collect()
}

/// Strip escape sequences and surrounding whitespace from a source literal.
fn clean_literal(raw: &str) -> Option<String> {
    let text = raw
        .replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\r", "")
        .replace("\\\"", "\"");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn named_literal(caps: &Captures, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| caps.name(name))
        .and_then(|m| clean_literal(m.as_str()))
}

fn no_declarations(_source: &str) -> Declarations {
    HashMap::new()
}

static FORMAT_CONVERSION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"%(?P<skip>\*)?\d*(?:hh|h|ll|l|L|z|j|t)?(?P<conv>[diouxXeEfFgGaAcs\[])"));

/// Kinds consumed by a scanf-style format string, in order.
fn format_kinds(format: &str) -> Vec<InputKind> {
    let format = format.replace("%%", "");
    FORMAT_CONVERSION
        .captures_iter(&format)
        .filter(|caps| caps.name("skip").is_none())
        .filter_map(|caps| {
            let conv = caps.name("conv")?.as_str().chars().next()?;
            InputKind::from_conversion(conv)
        })
        .collect()
}

// --- Python ---

static PYTHON: Rules = Rules {
    interactive: LazyLock::new(|| compile(r"\binput\s*\(|\bsys\.stdin\b")),
    print: LazyLock::new(|| compile(r#"\bprint\s*\(\s*[rRfFuU]?(?:"([^"]*)"|'([^']*)')"#)),
    reads: python_reads,
    declarations: no_declarations,
};

static PYTHON_READ: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(?:\b(?P<cast>int|float)\s*\(\s*|\bmap\s*\(\s*(?P<mapcast>int|float)\s*,\s*)?\binput\s*\(\s*(?:[rRfFuU]?(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'))?"#,
    )
});

fn python_reads(line: &str, _declared: &Declarations) -> Vec<Read> {
    PYTHON_READ
        .captures_iter(line)
        .filter_map(|caps| {
            let cast = caps.name("cast").or_else(|| caps.name("mapcast"));
            let kind = match cast.map(|m| m.as_str()) {
                Some("int") => InputKind::Integer,
                Some("float") => InputKind::Decimal,
                _ => InputKind::Text,
            };
            Some(Read {
                start: caps.get(0)?.start(),
                prompt: named_literal(&caps, &["dq", "sq"]),
                kinds: vec![kind],
            })
        })
        .collect()
}

// --- C ---

const C_INTERACTIVE: &str = r"\b(?:scanf|scanf_s|gets|gets_s|getchar|getch|getche)\s*\(|\bfscanf\s*\(\s*stdin\b|\bfgets\s*\([^;]*\bstdin\b";

static C: Rules = Rules {
    interactive: LazyLock::new(|| compile(C_INTERACTIVE)),
    print: LazyLock::new(|| compile(r#"\b(?:printf|puts)\s*\(\s*"([^"]*)""#)),
    reads: c_reads,
    declarations: no_declarations,
};

static C_READ: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"\b(?:scanf|scanf_s)\s*\(\s*"(?P<fmt>[^"]*)"|\bfscanf\s*\(\s*stdin\s*,\s*"(?P<ffmt>[^"]*)"|\b(?P<line>gets|gets_s)\s*\(|(?P<fgets>\bfgets\s*\([^;]*\bstdin\b)|\b(?P<ch>getchar|getch|getche)\s*\("#,
    )
});

fn c_reads(line: &str, _declared: &Declarations) -> Vec<Read> {
    C_READ
        .captures_iter(line)
        .filter_map(|caps| {
            let kinds = if let Some(fmt) = caps.name("fmt").or_else(|| caps.name("ffmt")) {
                format_kinds(fmt.as_str())
            } else if caps.name("ch").is_some() {
                vec![InputKind::Character]
            } else {
                vec![InputKind::Text]
            };
            Some(Read {
                start: caps.get(0)?.start(),
                prompt: None,
                kinds,
            })
        })
        .collect()
}

// --- C++ ---

static CPP: Rules = Rules {
    interactive: LazyLock::new(|| {
        compile(&format!(
            r"{C_INTERACTIVE}|\bcin\s*>>|\bgetline\s*\(\s*(?:std::)?cin\b"
        ))
    }),
    print: LazyLock::new(|| {
        compile(r#"\b(?:printf|puts)\s*\(\s*"([^"]*)"|\bcout\s*<<\s*"([^"]*)""#)
    }),
    reads: cpp_reads,
    declarations: cpp_declarations,
};

static CPP_CIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bcin\s*(?P<chain>(?:>>\s*[A-Za-z_][\w.\[\]]*\s*)+)")
});

static CPP_GETLINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bgetline\s*\(\s*(?:std::)?cin\b"));

static CPP_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?P<ty>(?:(?:unsigned|signed|long|short|const)\s+)*(?:int|long|short|float|double|char|bool|string|std::string))\s+(?P<names>[^;(){}]+);",
    )
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z_]\w*$"));

fn cpp_declarations(source: &str) -> Declarations {
    let mut declared = HashMap::new();
    for caps in CPP_DECLARATION.captures_iter(source) {
        let ty = &caps["ty"];
        for raw in caps["names"].split(',') {
            let is_array = raw.contains('[');
            let name = raw
                .split(['=', '['])
                .next()
                .unwrap_or_default()
                .trim()
                .trim_start_matches(['*', '&'])
                .trim();
            if !IDENTIFIER.is_match(name) {
                continue;
            }
            let kind = if ty.contains("float") || ty.contains("double") {
                InputKind::Decimal
            } else if ty.contains("string") || (ty.contains("char") && is_array) {
                InputKind::Text
            } else if ty.contains("char") {
                InputKind::Character
            } else {
                InputKind::Integer
            };
            declared.insert(name.to_string(), kind);
        }
    }
    declared
}

fn cpp_reads(line: &str, declared: &Declarations) -> Vec<Read> {
    let mut reads = c_reads(line, declared);

    for caps in CPP_CIN.captures_iter(line) {
        let (Some(whole), Some(chain)) = (caps.get(0), caps.name("chain")) else {
            continue;
        };
        let kinds = chain
            .as_str()
            .split(">>")
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(|target| {
                let base = target.split(['[', '.']).next().unwrap_or(target);
                declared.get(base).copied().unwrap_or(InputKind::Text)
            })
            .collect();
        reads.push(Read {
            start: whole.start(),
            prompt: None,
            kinds,
        });
    }

    for m in CPP_GETLINE.find_iter(line) {
        reads.push(Read {
            start: m.start(),
            prompt: None,
            kinds: vec![InputKind::Text],
        });
    }

    reads.sort_by_key(|read| read.start);
    reads
}

// --- Java ---

static JAVA: Rules = Rules {
    interactive: LazyLock::new(|| {
        compile(
            r"new\s+Scanner\s*\(\s*System\.in\b|new\s+InputStreamReader\s*\(\s*System\.in\b|System\.in\.read\s*\(|System\.console\s*\(\s*\)",
        )
    }),
    print: LazyLock::new(|| compile(r#"System\.out\.print(?:ln|f)?\s*\(\s*"([^"]*)""#)),
    reads: java_reads,
    declarations: java_readers,
};

static JAVA_READER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:Scanner|BufferedReader|Console)\s+(?P<name>[A-Za-z_]\w*)\s*=")
});

static JAVA_READ: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(?:\b(?P<parse>Integer\.parseInt|Long\.parseLong|Double\.parseDouble|Float\.parseFloat)\s*\(\s*)?\b(?P<recv>\w+)\s*\.\s*(?:(?P<method>nextInt|nextLong|nextShort|nextByte|nextDouble|nextFloat|nextBoolean|nextLine|next|readLine)\s*\(\s*\)(?P<charat>\s*\.\s*charAt\b)?|readLine\s*\(\s*"(?P<prompt>[^"]*)")|(?P<raw>System\.in\.read)\s*\("#,
    )
});

/// Names bound to console readers; stored as `Text` only to reuse the map type.
fn java_readers(source: &str) -> Declarations {
    JAVA_READER
        .captures_iter(source)
        .map(|caps| (caps["name"].to_string(), InputKind::Text))
        .collect()
}

fn java_reads(line: &str, readers: &Declarations) -> Vec<Read> {
    JAVA_READ
        .captures_iter(line)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            if caps.name("raw").is_some() {
                return Some(Read {
                    start,
                    prompt: None,
                    kinds: vec![InputKind::Character],
                });
            }

            let recv = caps.name("recv")?.as_str();
            if !readers.is_empty() && !readers.contains_key(recv) {
                return None;
            }

            let kind = match caps.name("parse").map(|m| m.as_str()) {
                Some("Integer.parseInt" | "Long.parseLong") => InputKind::Integer,
                Some(_) => InputKind::Decimal,
                None => match caps.name("method").map(|m| m.as_str()) {
                    Some("nextInt" | "nextLong" | "nextShort" | "nextByte") => InputKind::Integer,
                    Some("nextDouble" | "nextFloat") => InputKind::Decimal,
                    _ if caps.name("charat").is_some() => InputKind::Character,
                    _ => InputKind::Text,
                },
            };
            Some(Read {
                start,
                prompt: named_literal(&caps, &["prompt"]),
                kinds: vec![kind],
            })
        })
        .collect()
}

// --- JavaScript ---

static JAVASCRIPT: Rules = Rules {
    interactive: LazyLock::new(|| {
        compile(r"\bprompt\s*\(|\breadline\b|\bprocess\.stdin\b|\.question(?:Int|Float)?\s*\(")
    }),
    print: LazyLock::new(|| {
        compile(
            r#"(?:\bconsole\.log|\bprocess\.stdout\.write)\s*\(\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#,
        )
    }),
    reads: javascript_reads,
    declarations: no_declarations,
};

static JAVASCRIPT_READ: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(?:\b(?P<cast>parseInt|parseFloat|Number)\s*\(\s*)?(?:\bawait\s+)?(?:\b\w+\s*\.\s*)?\b(?P<func>prompt|question|questionInt|questionFloat)\s*\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|`(?P<bq>[^`]*)`)?"#,
    )
});

fn javascript_reads(line: &str, _declared: &Declarations) -> Vec<Read> {
    JAVASCRIPT_READ
        .captures_iter(line)
        .filter_map(|caps| {
            let kind = match (
                caps.name("cast").map(|m| m.as_str()),
                caps.name("func").map(|m| m.as_str()),
            ) {
                (Some("parseInt"), _) | (_, Some("questionInt")) => InputKind::Integer,
                (Some(_), _) | (_, Some("questionFloat")) => InputKind::Decimal,
                _ => InputKind::Text,
            };
            Some(Read {
                start: caps.get(0)?.start(),
                prompt: named_literal(&caps, &["dq", "sq", "bq"]),
                kinds: vec![kind],
            })
        })
        .collect()
}

// --- PHP ---

static PHP: Rules = Rules {
    interactive: LazyLock::new(|| {
        compile(
            r"\breadline\s*\(|\bfgets\s*\(\s*STDIN\b|\bfscanf\s*\(\s*STDIN\b|php://stdin|\bstream_get_line\s*\(\s*STDIN\b",
        )
    }),
    print: LazyLock::new(|| {
        compile(r#"\b(?:echo|print|printf)\s*\(?\s*(?:"([^"]*)"|'([^']*)')"#)
    }),
    reads: php_reads,
    declarations: no_declarations,
};

static PHP_READ: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(?:\((?P<cast>int|integer|float|double)\)\s*|\b(?P<castfn>intval|floatval)\s*\(\s*)?(?:\btrim\s*\(\s*)?(?:\breadline\s*\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')?|\b(?:fgets|stream_get_line)\s*\(\s*STDIN\b|\bfscanf\s*\(\s*STDIN\s*,\s*(?:"(?P<fmt>[^"]*)"|'(?P<sfmt>[^']*)'))"#,
    )
});

fn php_reads(line: &str, _declared: &Declarations) -> Vec<Read> {
    PHP_READ
        .captures_iter(line)
        .filter_map(|caps| {
            let kinds = if let Some(fmt) = caps.name("fmt").or_else(|| caps.name("sfmt")) {
                format_kinds(fmt.as_str())
            } else {
                let cast = caps.name("cast").or_else(|| caps.name("castfn"));
                vec![match cast.map(|m| m.as_str()) {
                    Some("int" | "integer" | "intval") => InputKind::Integer,
                    Some(_) => InputKind::Decimal,
                    None => InputKind::Text,
                }]
            };
            Some(Read {
                start: caps.get(0)?.start(),
                prompt: named_literal(&caps, &["dq", "sq"]),
                kinds,
            })
        })
        .collect()
}
