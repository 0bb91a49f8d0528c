use crate::Result;
use crate::error::ReportError;
use crate::testlog::row::Measurement;
use anyhow::Context;
use regex::Regex;
use std::fs;

/// Marker line that opens a block of measurement lines.
const LOGS_MARKER: &str = "Logs:";
const DIRECT_MARKER: &str = "(direct)";

/// Lexer for a single measurement line.
///
/// Expected shape (anything between the groups is ignored):
/// [market] ... (testName) ... (actionName[--suffix]) ... [(direct)] ... [gas: N]
///
/// Example:
/// [MarketA] (testBorrow) (supply--variant1) gas: 45000
pub struct LineLexer {
    groups: Regex,
    gas: Regex,
}

impl LineLexer {
    pub fn new() -> Result<Self> {
        // Capture:
        // market: between the first '[' and the first ']'
        // test:   first (...) after that ']'
        // The match ends on the '(' opening the action group; its balanced
        // closing ')' is found by `balanced_group`.
        const GROUPS_RE: &str = r#"^[^\[]*\[(?P<market>[^\]]*)\][^(]*\((?P<test>[^)]*)\)[^(]*\("#;
        const GAS_RE: &str = r#"gas:\s*(?P<gas>\d+)"#;
        Ok(Self {
            groups: Regex::new(GROUPS_RE)?,
            gas: Regex::new(GAS_RE)?,
        })
    }

    /// Extract a measurement from one candidate line.
    pub fn lex(&self, line: &str) -> std::result::Result<Measurement, ReportError> {
        let caps = self
            .groups
            .captures(line)
            .ok_or_else(|| {
                ReportError::malformed("missing [market] (test) (action) groups", line)
            })?;

        let market = caps["market"].trim();
        let test_name = caps["test"].trim();

        let action_start = caps.get(0).map_or(line.len(), |m| m.end());
        let action = balanced_group(&line[action_start..])
            .ok_or_else(|| ReportError::malformed("unbalanced action group", line))?;
        let action_name = match action.find("--") {
            Some(idx) => &action[..idx],
            None => action,
        }
        .trim();

        // No `gas:` token, or one without digits after it, means not measured.
        let gas_usage = match self.gas.captures(line) {
            Some(gas_caps) => gas_caps["gas"]
                .parse::<u64>()
                .map_err(|_| ReportError::malformed("gas value out of range", line))?,
            None => 0,
        };

        Ok(Measurement {
            market: market.to_string(),
            test_name: test_name.to_string(),
            action_name: action_name.to_string(),
            gas_usage,
            is_direct_call: line.contains(DIRECT_MARKER),
        })
    }
}

/// Text up to the `)` that closes an already opened `(`, honoring nesting.
fn balanced_group(rest: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (idx, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(&rest[..idx]),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Recognition window of the output scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Unarmed,
    Armed,
}

/// Parse the captured stdout of a test run into measurements.
///
/// A line containing `Logs:` arms the scanner; every following non-blank line
/// is lexed until the next blank line disarms it. Malformed lines are logged
/// and skipped.
pub fn parse_output(text: &str) -> Result<Vec<Measurement>> {
    let lexer = LineLexer::new()?;

    let mut out = Vec::new();
    let mut window = Window::Unarmed;
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let line = line.trim();

        if line.is_empty() {
            window = Window::Unarmed;
            continue;
        }

        match window {
            Window::Armed => match lexer.lex(line) {
                Ok(m) => out.push(m),
                Err(e) => log::warn!("skipping {}", e.at_line(lno)),
            },
            Window::Unarmed => {
                if line.contains(LOGS_MARKER) {
                    window = Window::Armed;
                }
            }
        }
    }

    log::debug!("parsed {} measurement lines", out.len());
    Ok(out)
}

/// Parse a captured test run stored on disk.
pub fn parse_log_file(path: &str) -> Result<Vec<Measurement>> {
    let text = fs::read_to_string(path).with_context(|| format!("read log file {}", path))?;
    parse_output(&text)
}
