use crate::types::DeployerError;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Asks the operator to pick one of a fixed list of choices.
pub trait Prompter {
    /// Show `message` and `choices`, return the index of the chosen entry
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, DeployerError>;
}

/// Numbered menu on stdout, answers read line by line from stdin
pub struct StdinPrompter<R> {
    input: R,
}

impl StdinPrompter<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> StdinPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompter for StdinPrompter<R> {
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, DeployerError> {
        loop {
            println!("\n{}", message.bold());
            for (i, choice) in choices.iter().enumerate() {
                println!("  {}) {}", i + 1, choice);
            }
            print!("{} ", ">".cyan());
            io::stdout().flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
            }
            match parse_choice(&line, choices.len()) {
                Some(index) => return Ok(index),
                None => println!("{}", format!("Enter a number between 1 and {}", choices.len()).red()),
            }
        }
    }
}

fn parse_choice(line: &str, len: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Replays a fixed list of answers (by choice label) and records every menu
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub shown: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            shown: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, DeployerError> {
        self.shown.push(message.to_string());
        let answer = self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, format!("no answer scripted for `{message}`"))
        })?;
        choices
            .iter()
            .position(|c| c.contains(&answer))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("`{answer}` not offered")).into()
            })
    }
}
