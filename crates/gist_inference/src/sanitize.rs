//! Removes chain-of-thought markup that some models emit before their answer.
//!
//! Sanitizing is a fixed sequence of small transforms, applied in order. Each
//! one is exposed on its own so it can be tested in isolation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref THINK_BLOCK: Regex = Regex::new(r"(?is)<think(?:ing)?>.*?</think(?:ing)?>").unwrap();
    static ref INLINE_THINKING: Regex =
        Regex::new(r"(?is)\bthink(?:ing)?\b.*?done\s+thinking\.").unwrap();
    // `\s` also takes the `\r` of CRLF output and non-breaking spaces.
    static ref THINKING_LINE: Regex = Regex::new(r"(?im)^\s*thinking[.:…]*\s*$").unwrap();
}

pub struct Transform {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

pub const TRANSFORMS: &[Transform] = &[
    Transform {
        name: "think-blocks",
        apply: strip_think_blocks,
    },
    Transform {
        name: "inline-thinking",
        apply: strip_inline_thinking,
    },
    Transform {
        name: "thinking-lines",
        apply: strip_thinking_lines,
    },
    Transform {
        name: "whitespace",
        apply: normalize_whitespace,
    },
];

pub fn sanitize(text: &str) -> String {
    TRANSFORMS
        .iter()
        .fold(text.to_string(), |acc, transform| (transform.apply)(&acc))
}

/// `<think>...</think>` blocks, tags included.
pub fn strip_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").into_owned()
}

/// `Thinking... ...done thinking.` spans as printed by the Ollama CLI.
pub fn strip_inline_thinking(text: &str) -> String {
    INLINE_THINKING.replace_all(text, "").into_owned()
}

pub fn strip_thinking_lines(text: &str) -> String {
    THINKING_LINE.replace_all(text, "").into_owned()
}

/// Trims every line, collapses inner whitespace runs and drops blank lines.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
