//! Best-effort parsing of incomplete JSON text.
//!
//! DESIGN
//! ======
//! The generation stream delivers one JSON document split into arbitrary
//! fragments. After every fragment the whole buffer is handed to a
//! [`JsonRepair`] strategy; `None` means "not ready yet" and is the normal
//! result while the document is still arriving.
//!
//! [`ClosingRepair`] scans the buffer once, tracking string/escape state and a
//! stack of open containers together with the token each container expects
//! next. From that it synthesizes the missing tail: close an open string,
//! give a dangling key a `null` value, drop a dangling comma, and append the
//! closers. A partial literal (`tru`, `1.`) cannot be completed, so the scan
//! also remembers the last clean cut point (after a completed value or an
//! opening bracket) and retries from there.

use serde_json::Value;

/// A tolerant parsing strategy. Returns `None` when the text cannot be
/// turned into a JSON value yet.
pub trait JsonRepair: Send + Sync {
    fn parse(&self, text: &str) -> Option<Value>;
}

/// Plain `serde_json` parse; succeeds only on complete documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson;

impl JsonRepair for StrictJson {
    fn parse(&self, text: &str) -> Option<Value> {
        serde_json::from_str(text).ok()
    }
}

/// Bracket/quote-closing heuristic for truncated documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosingRepair;

impl JsonRepair for ClosingRepair {
    fn parse(&self, text: &str) -> Option<Value> {
        let scan = Scan::run(text);
        if let Some(value) = scan.complete(text).and_then(|candidate| serde_json::from_str(&candidate).ok()) {
            return Some(value);
        }
        let cut = scan.last_cut.as_ref()?;
        let mut candidate = text[..cut.end].trim_end().to_owned();
        push_closers(&mut candidate, &cut.stack);
        serde_json::from_str(&candidate).ok()
    }
}

/// Ordered chain of strategies; the first one that yields a value wins.
pub struct TolerantParser {
    strategies: Vec<Box<dyn JsonRepair>>,
}

impl TolerantParser {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn JsonRepair>>) -> Self {
        Self { strategies }
    }
}

impl Default for TolerantParser {
    /// Strict parse first, then the closing heuristic.
    fn default() -> Self {
        Self::new(vec![Box::new(StrictJson), Box::new(ClosingRepair)])
    }
}

impl JsonRepair for TolerantParser {
    fn parse(&self, text: &str) -> Option<Value> {
        self.strategies.iter().find_map(|strategy| strategy.parse(text))
    }
}

// =============================================================================
// SCANNER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// Next token a container is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    Separator,
}

#[derive(Debug, Clone, Copy)]
struct Level {
    container: Container,
    expect: Expect,
}

#[derive(Debug)]
struct Cut {
    end: usize,
    stack: Vec<Level>,
}

#[derive(Debug)]
struct Scan {
    stack: Vec<Level>,
    top_expect: Expect,
    in_string: bool,
    string_is_key: bool,
    escape: bool,
    escape_start: usize,
    unicode_left: u8,
    in_literal: bool,
    last_cut: Option<Cut>,
}

impl Scan {
    fn run(text: &str) -> Self {
        let mut scan = Self {
            stack: Vec::new(),
            top_expect: Expect::Value,
            in_string: false,
            string_is_key: false,
            escape: false,
            escape_start: 0,
            unicode_left: 0,
            in_literal: false,
            last_cut: None,
        };
        for (i, ch) in text.char_indices() {
            scan.step(i, ch);
        }
        scan
    }

    fn step(&mut self, i: usize, ch: char) {
        if self.in_string {
            self.step_string(i, ch);
            return;
        }
        if self.in_literal {
            if !(matches!(ch, ',' | '}' | ']' | ':') || ch.is_whitespace()) {
                return;
            }
            self.in_literal = false;
            self.value_completed(i);
        }
        match ch {
            '"' => {
                self.in_string = true;
                self.string_is_key = matches!(
                    self.stack.last(),
                    Some(Level { container: Container::Object, expect: Expect::Key })
                );
            }
            '{' => self.open(Container::Object, i + 1),
            '[' => self.open(Container::Array, i + 1),
            '}' | ']' => {
                self.stack.pop();
                self.value_completed(i + 1);
            }
            ':' => *self.expect_mut() = Expect::Value,
            ',' => {
                let next = match self.stack.last() {
                    Some(Level { container: Container::Object, .. }) => Expect::Key,
                    _ => Expect::Value,
                };
                *self.expect_mut() = next;
            }
            c if c.is_whitespace() => {}
            _ => self.in_literal = true,
        }
    }

    fn step_string(&mut self, i: usize, ch: char) {
        if self.unicode_left > 0 {
            self.unicode_left = if ch.is_ascii_hexdigit() { self.unicode_left - 1 } else { 0 };
            return;
        }
        if self.escape {
            self.escape = false;
            if ch == 'u' {
                self.unicode_left = 4;
            }
            return;
        }
        match ch {
            '\\' => {
                self.escape = true;
                self.escape_start = i;
            }
            '"' => {
                self.in_string = false;
                if self.string_is_key {
                    *self.expect_mut() = Expect::Colon;
                } else {
                    self.value_completed(i + 1);
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, container: Container, end: usize) {
        let expect = match container {
            Container::Object => Expect::Key,
            Container::Array => Expect::Value,
        };
        self.stack.push(Level { container, expect });
        self.record_cut(end);
    }

    fn value_completed(&mut self, end: usize) {
        *self.expect_mut() = Expect::Separator;
        self.record_cut(end);
    }

    fn record_cut(&mut self, end: usize) {
        self.last_cut = Some(Cut { end, stack: self.stack.clone() });
    }

    fn expect(&self) -> Expect {
        self.stack.last().map_or(self.top_expect, |level| level.expect)
    }

    fn expect_mut(&mut self) -> &mut Expect {
        match self.stack.last_mut() {
            Some(level) => &mut level.expect,
            None => &mut self.top_expect,
        }
    }

    /// Synthesize a candidate document from the full text.
    fn complete(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len() + self.stack.len() + 8);
        if self.in_string {
            let keep = if self.escape || self.unicode_left > 0 { self.escape_start } else { text.len() };
            out.push_str(&text[..keep]);
            out.push('"');
            if self.string_is_key {
                out.push_str(":null");
            }
        } else {
            out.push_str(text.trim_end());
            if out.is_empty() {
                return None;
            }
            match self.expect() {
                Expect::Colon => out.push_str(":null"),
                Expect::Value if out.ends_with(':') => out.push_str("null"),
                Expect::Value | Expect::Key if out.ends_with(',') => {
                    out.pop();
                }
                _ => {}
            }
        }
        push_closers(&mut out, &self.stack);
        Some(out)
    }
}

fn push_closers(out: &mut String, stack: &[Level]) {
    for level in stack.iter().rev() {
        out.push(match level.container {
            Container::Object => '}',
            Container::Array => ']',
        });
    }
}

#[cfg(test)]
#[path = "repair_test.rs"]
mod repair_test;
