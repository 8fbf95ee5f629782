// src/extraction/repair.rs
//! Tolerant repair of near-JSON model output.
//!
//! Models wrap payloads in markdown fences, add prose around them, use single
//! or typographic quotes, leave keys unquoted, write Python literals, forget
//! commas, leave trailing commas, or stop mid-object. `repair_json` rewrites
//! the first structured value it finds into text that `serde_json` accepts
//! whenever the intent is recoverable. Anything it cannot fix is left for the
//! strict parser to reject.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("code fence pattern is valid")
});

const LEFT_DOUBLE: char = '\u{201C}';
const RIGHT_DOUBLE: char = '\u{201D}';
const LEFT_SINGLE: char = '\u{2018}';
const RIGHT_SINGLE: char = '\u{2019}';

/// Repair `raw` into (ideally) valid JSON text.
pub fn repair_json(raw: &str) -> String {
    let body = strip_code_fences(raw);
    match body.find(|c: char| c == '{' || c == '[') {
        Some(start) => Repairer::new(&body[start..]).run(),
        None => body.trim().to_string(),
    }
}

fn strip_code_fences(raw: &str) -> String {
    if let Some(caps) = CODE_FENCE.captures(raw) {
        return caps[1].to_string();
    }
    // An opening fence without a closing one: drop the marker and keep going.
    match raw.find("```") {
        Some(pos) => {
            let after = &raw[pos + 3..];
            let skip = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(after.len());
            after[skip..].to_string()
        }
        None => raw.to_string(),
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | LEFT_DOUBLE | RIGHT_DOUBLE | LEFT_SINGLE | RIGHT_SINGLE)
}

fn closes_quote(open: char, c: char) -> bool {
    match open {
        '"' => c == '"' || c == RIGHT_DOUBLE,
        '\'' => c == '\'',
        LEFT_DOUBLE | RIGHT_DOUBLE => matches!(c, '"' | LEFT_DOUBLE | RIGHT_DOUBLE),
        _ => matches!(c, '\'' | LEFT_SINGLE | RIGHT_SINGLE),
    }
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    out: String,
    closers: Vec<char>,
}

impl Repairer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            out: String::with_capacity(text.len() + 16),
            closers: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn last_significant(&self) -> Option<char> {
        self.out.trim_end().chars().last()
    }

    fn run(mut self) -> String {
        while let Some(c) = self.peek(0) {
            match c {
                '{' | '[' => {
                    self.insert_missing_comma();
                    self.closers.push(if c == '{' { '}' } else { ']' });
                    self.out.push(c);
                    self.pos += 1;
                }
                '}' | ']' => {
                    self.pos += 1;
                    // A closer that does not match the open container is noise.
                    if self.closers.last() == Some(&c) {
                        self.drop_trailing_comma();
                        self.fill_missing_value();
                        self.closers.pop();
                        self.out.push(c);
                        if self.closers.is_empty() {
                            break;
                        }
                    }
                }
                ',' => {
                    self.pos += 1;
                    self.fill_missing_value();
                    if !matches!(self.last_significant(), Some(',' | '{' | '[') | None) {
                        self.out.push(',');
                    }
                }
                ':' => {
                    self.pos += 1;
                    self.out.push(':');
                }
                '/' if self.peek(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek(1) == Some('*') => self.skip_block_comment(),
                c if is_quote(c) => {
                    self.insert_missing_comma();
                    self.read_string();
                }
                c if c.is_whitespace() => {
                    self.out.push(c);
                    self.pos += 1;
                }
                c if c.is_ascii_digit() || (c == '-' && self.starts_number(1)) => self.read_number(),
                // A dash that does not start a number is stray punctuation.
                '-' => self.pos += 1,
                _ => self.read_bare_word(),
            }
        }

        self.drop_trailing_comma();
        self.fill_missing_value();
        while let Some(closer) = self.closers.pop() {
            self.out.push(closer);
        }
        self.out
    }

    /// Separate two adjacent values that the model forgot to split with a comma.
    fn insert_missing_comma(&mut self) {
        if self.closers.is_empty() {
            return;
        }
        if let Some(last) = self.last_significant() {
            if matches!(last, '"' | '}' | ']') || last.is_ascii_alphanumeric() {
                self.out.push(',');
            }
        }
    }

    fn drop_trailing_comma(&mut self) {
        let trimmed_len = self.out.trim_end().len();
        if self.out[..trimmed_len].ends_with(',') {
            self.out.truncate(trimmed_len - 1);
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.peek(0) == Some('*') && self.peek(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// A quote only ends the string when what follows looks like structure:
    /// a delimiter, another value on a new line, or the end of input.
    fn quote_ends_string(&self) -> bool {
        let mut i = self.pos + 1;
        let mut crossed_newline = false;
        while let Some(&c) = self.chars.get(i) {
            if !c.is_whitespace() {
                break;
            }
            crossed_newline |= c == '\n';
            i += 1;
        }
        match self.chars.get(i) {
            None => true,
            Some(&c) => crossed_newline || matches!(c, ',' | ':' | '}' | ']') || is_quote(c),
        }
    }

    fn read_string(&mut self) {
        let open = self.chars[self.pos];
        self.pos += 1;
        self.out.push('"');

        while let Some(c) = self.peek(0) {
            if c == '\\' {
                match self.peek(1) {
                    Some('\'') => self.out.push('\''),
                    Some(next) if "\"\\/bfnrtu".contains(next) => {
                        self.out.push('\\');
                        self.out.push(next);
                    }
                    Some(next) => {
                        self.out.push_str("\\\\");
                        self.out.push(next);
                    }
                    None => {}
                }
                self.pos += 2;
                continue;
            }

            if closes_quote(open, c) && self.quote_ends_string() {
                self.pos += 1;
                self.out.push('"');
                return;
            }

            match c {
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 => {}
                c => self.out.push(c),
            }
            self.pos += 1;
        }

        // Input ended inside the string.
        self.out.push('"');
    }

    /// A key followed by `:` and then nothing gets an explicit `null`.
    fn fill_missing_value(&mut self) {
        if self.last_significant() == Some(':') {
            self.out.push_str("null");
        }
    }

    fn starts_number(&self, offset: usize) -> bool {
        matches!(self.peek(offset), Some(c) if c.is_ascii_digit() || c == '.')
    }

    fn read_number(&mut self) {
        self.insert_missing_comma();
        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
                self.out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_significant_from(&self, from: usize) -> Option<char> {
        self.chars[from.min(self.chars.len())..]
            .iter()
            .copied()
            .find(|c| !c.is_whitespace())
    }

    fn read_bare_word(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '$') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            // Stray symbol such as a bullet; drop it.
            self.pos += 1;
            return;
        }

        let word: String = self.chars[start..self.pos].iter().collect();
        self.insert_missing_comma();

        if self.next_significant_from(self.pos) == Some(':') {
            self.out.push('"');
            self.out.push_str(&word);
            self.out.push('"');
            return;
        }

        let literal = match word.as_str() {
            "true" | "True" | "TRUE" => Some("true"),
            "false" | "False" | "FALSE" => Some("false"),
            "null" | "Null" | "NULL" | "None" | "undefined" => Some("null"),
            _ => None,
        };
        if let Some(literal) = literal {
            self.out.push_str(literal);
            return;
        }

        // Unquoted text value: take everything up to the next delimiter.
        while let Some(c) = self.peek(0) {
            if matches!(c, ',' | '}' | ']' | '\n') {
                break;
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.out.push('"');
        for c in text.trim_end().chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                c if (c as u32) < 0x20 => {}
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}
