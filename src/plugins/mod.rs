//! The six named transform capabilities and their by-name registry.
//!
//! Each plugin is a pure (or side-effecting but stateless) function
//! `string -> string | None-on-failure`. None of these ever fail in this
//! implementation — they are total over `&str` — but the `Option` return
//! keeps the signature uniform with the engine's transform-failure policy
//! (spec.md §7): a future plugin that *can* fail (e.g. one validating input
//! against a schema) slots into the same `Transform` type without changing
//! the worker loop.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::stage::Transform;

/// Delay between characters printed by [`typewriter`], matching the
/// original implementation's per-character `usleep`.
pub const TYPEWRITER_DELAY: Duration = Duration::from_millis(100);

/// Writes `[logger] <input>` to stdout and forwards `input` unchanged.
pub fn logger() -> Transform {
    logger_to(Arc::new(Mutex::new(io::stdout())))
}

/// Same as [`logger`], but writing to an injected sink instead of real
/// stdout — used by tests that need to capture the emitted lines.
pub fn logger_to<W: Write + Send + 'static>(sink: Arc<Mutex<W>>) -> Transform {
    Arc::new(move |input: &str| {
        let mut sink = sink.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(sink, "[logger] {input}");
        let _ = sink.flush();
        Some(input.to_string())
    })
}

/// Prints each input character to stdout separated by
/// [`TYPEWRITER_DELAY`], then a newline; forwards `input` unchanged.
pub fn typewriter() -> Transform {
    typewriter_to(Arc::new(Mutex::new(io::stdout())))
}

pub fn typewriter_to<W: Write + Send + 'static>(sink: Arc<Mutex<W>>) -> Transform {
    Arc::new(move |input: &str| {
        let mut sink = sink.lock().unwrap_or_else(|e| e.into_inner());
        let _ = write!(sink, "[typewriter] ");
        for ch in input.chars() {
            let _ = write!(sink, "{ch}");
            let _ = sink.flush();
            std::thread::sleep(TYPEWRITER_DELAY);
        }
        let _ = writeln!(sink);
        Some(input.to_string())
    })
}

/// Maps ASCII letters a-z to A-Z; every other character unchanged.
pub fn uppercaser() -> Transform {
    Arc::new(|input: &str| Some(uppercase(input)))
}

fn uppercase(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_lowercase() { c.to_ascii_uppercase() } else { c })
        .collect()
}

/// Cyclically shifts `input` right by one position: the final character
/// moves to position 0.
pub fn rotator() -> Transform {
    Arc::new(|input: &str| Some(rotate_right(input)))
}

fn rotate_right(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() < 2 {
        return input.to_string();
    }
    let mut rotated = Vec::with_capacity(chars.len());
    rotated.push(chars[chars.len() - 1]);
    rotated.extend_from_slice(&chars[..chars.len() - 1]);
    rotated.into_iter().collect()
}

/// Reverses character order.
pub fn flipper() -> Transform {
    Arc::new(|input: &str| Some(input.chars().rev().collect()))
}

/// Inserts one space between adjacent characters.
pub fn expander() -> Transform {
    Arc::new(|input: &str| Some(expand(input)))
}

fn expand(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for (i, ch) in input.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// The six stage names accepted on the command line, in the order listed
/// by spec.md §6.
pub const STAGE_NAMES: [&str; 6] = [
    "logger",
    "typewriter",
    "uppercaser",
    "rotator",
    "flipper",
    "expander",
];

/// Resolves a stage name to its transform capability, or `None` if the
/// name is not one of [`STAGE_NAMES`].
pub fn resolve(name: &str) -> Option<Transform> {
    match name {
        "logger" => Some(logger()),
        "typewriter" => Some(typewriter()),
        "uppercaser" => Some(uppercaser()),
        "rotator" => Some(rotator()),
        "flipper" => Some(flipper()),
        "expander" => Some(expander()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercaser_ascii_only() {
        assert_eq!(uppercase("Hello, World! 123"), "HELLO, WORLD! 123");
    }

    #[test]
    fn test_uppercaser_leaves_non_ascii_untouched() {
        assert_eq!(uppercase("héllo"), "HéLLO");
        assert_eq!(uppercase("café"), "CAFé");
    }

    #[test]
    fn test_rotator_single_shift() {
        assert_eq!(rotate_right("abcd"), "dabc");
    }

    #[test]
    fn test_rotator_short_inputs_unchanged() {
        assert_eq!(rotate_right(""), "");
        assert_eq!(rotate_right("a"), "a");
    }

    #[test]
    fn test_flipper_reverses() {
        let f = flipper();
        assert_eq!(f("hello").unwrap(), "olleh");
    }

    #[test]
    fn test_expander_inserts_spaces() {
        assert_eq!(expand("abc"), "a b c");
        assert_eq!(expand("a"), "a");
        assert_eq!(expand(""), "");
    }

    #[test]
    fn test_expander_output_length() {
        let input = "hello";
        assert_eq!(expand(input).len(), 2 * input.chars().count() - 1);
    }

    #[test]
    fn test_logger_writes_expected_line() {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let logger = logger_to(buf.clone());
        let out = logger("hi").unwrap();
        assert_eq!(out, "hi");
        drop(logger);

        let written = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "[logger] hi\n");
    }

    #[test]
    fn test_resolve_known_and_unknown_names() {
        assert!(resolve("uppercaser").is_some());
        assert!(resolve("nonexistent").is_none());
        for name in STAGE_NAMES {
            assert!(resolve(name).is_some());
        }
    }
}
