/*
 * This file is part of drvkit.
 *
 * Copyright (C) 2025 drvkit contributors
 *
 * drvkit is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * drvkit is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with drvkit. If not, see <https://www.gnu.org/licenses/>.
 */

//! Interactive version selection
//!
//! Lists the matching version folders and lets the operator pick one.
//! Pressing Enter takes the newest; `q` declines.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local};
use dk_core::{Disambiguator, NewestFirst, PackageVersionFolder};
use tracing::warn;

/// Invalid answers tolerated before giving up
const MAX_ATTEMPTS: usize = 3;

pub struct ConsoleChooser<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl ConsoleChooser<io::StdinLock<'static>, io::Stderr> {
    /// Reads stdin and prompts on stderr, leaving stdout to command output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsoleChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn prompt(&self, candidates: &[PackageVersionFolder], default: usize) -> io::Result<Option<usize>> {
        let mut out = self.output.borrow_mut();
        let mut input = self.input.borrow_mut();

        writeln!(out, "Multiple driver versions match this device:")?;
        for (i, candidate) in candidates.iter().enumerate() {
            let modified = candidate
                .modified
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            let marker = if i == default { " (newest)" } else { "" };
            writeln!(out, "  [{}] {}  {}{}", i + 1, candidate.name, modified, marker)?;
        }

        for _ in 0..MAX_ATTEMPTS {
            write!(out, "Select version [1-{}], Enter for newest, q to skip: ", candidates.len())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF: no operator attached
                return Ok(Some(default));
            }

            match parse_answer(line.trim(), candidates.len()) {
                Answer::Default => return Ok(Some(default)),
                Answer::Skip => return Ok(None),
                Answer::Pick(index) => return Ok(Some(index)),
                Answer::Invalid => writeln!(out, "Please enter a number between 1 and {}.", candidates.len())?,
            }
        }

        writeln!(out, "No valid selection made; skipping installation.")?;
        Ok(None)
    }
}

impl<R: BufRead, W: Write> Disambiguator for ConsoleChooser<R, W> {
    fn choose(&self, candidates: &[PackageVersionFolder]) -> Option<usize> {
        let default = NewestFirst.choose(candidates)?;
        match self.prompt(candidates, default) {
            Ok(choice) => choice,
            Err(e) => {
                warn!(error = %e, "Console unavailable; taking the newest version");
                Some(default)
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Default,
    Skip,
    Pick(usize),
    Invalid,
}

fn parse_answer(answer: &str, count: usize) -> Answer {
    if answer.is_empty() {
        return Answer::Default;
    }
    if answer.eq_ignore_ascii_case("q") {
        return Answer::Skip;
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Answer::Pick(n - 1),
        _ => Answer::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn candidates() -> Vec<PackageVersionFolder> {
        ["30.0.101.1340", "31.0.101.4502"]
            .iter()
            .enumerate()
            .map(|(i, name)| PackageVersionFolder {
                name: name.to_string(),
                path: PathBuf::from(name),
                modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + i as u64)),
            })
            .collect()
    }

    fn choose_with(input: &str) -> (Option<usize>, String) {
        let chooser = ConsoleChooser::new(Cursor::new(input.to_string()), Vec::new());
        let choice = chooser.choose(&candidates());
        let output = String::from_utf8(chooser.into_output()).unwrap();
        (choice, output)
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("", 3), Answer::Default);
        assert_eq!(parse_answer("Q", 3), Answer::Skip);
        assert_eq!(parse_answer("2", 3), Answer::Pick(1));
        assert_eq!(parse_answer("0", 3), Answer::Invalid);
        assert_eq!(parse_answer("4", 3), Answer::Invalid);
        assert_eq!(parse_answer("two", 3), Answer::Invalid);
    }

    #[test]
    fn test_enter_takes_newest() {
        let (choice, output) = choose_with("\n");
        assert_eq!(choice, Some(1));
        assert!(output.contains("[2] 31.0.101.4502"));
        assert!(output.contains("(newest)"));
    }

    #[test]
    fn test_explicit_pick() {
        assert_eq!(choose_with("1\n").0, Some(0));
    }

    #[test]
    fn test_retry_then_skip() {
        let (choice, output) = choose_with("9\nq\n");
        assert_eq!(choice, None);
        assert!(output.contains("Please enter a number between 1 and 2."));
    }

    #[test]
    fn test_gives_up_after_invalid_answers() {
        let (choice, output) = choose_with("x\ny\nz\n1\n");
        assert_eq!(choice, None);
        assert!(output.contains("skipping installation"));
    }

    #[test]
    fn test_eof_takes_newest() {
        assert_eq!(choose_with("").0, Some(1));
    }
}
