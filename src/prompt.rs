//! Interactive prompts.
//!
//! The session layer never talks to a terminal directly; it asks a
//! [`Prompter`] to pick from a list, read a secret, or show a message.
//! Returning `None` from a prompt means the user dismissed it.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use owo_colors::OwoColorize;

#[async_trait]
pub trait Prompter: Send + Sync {
    /// Pick one of `items`; returns its index.
    async fn pick(&self, title: &str, items: &[String]) -> Option<usize>;

    /// Read a secret value (API key, token) without echoing it.
    async fn input_secret(&self, prompt: &str) -> Option<String>;

    fn info(&self, message: &str);

    fn error(&self, message: &str);
}

/// Prompts on stdin/stderr. Every prompt is dismissed when stdin is not a TTY.
/// Secrets are read in raw mode, so nothing typed is shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    async fn ask(prompt: String, secret: bool) -> Option<String> {
        if !atty::is(atty::Stream::Stdin) {
            tracing::debug!("stdin is not a terminal; dismissing prompt");
            return None;
        }

        let answer = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
            let mut stderr = io::stderr();
            write!(stderr, "{prompt}")?;
            stderr.flush()?;

            if secret {
                read_secret()
            } else {
                read_line()
            }
        })
        .await;

        match answer {
            Ok(Ok(Some(answer))) => {
                let answer = answer.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                tracing::warn!("failed to read from the terminal: {e}");
                None
            }
            Err(e) => {
                tracing::warn!("prompt task failed: {e}");
                None
            }
        }
    }
}

fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Read a line in raw mode so the typed secret is never echoed.
fn read_secret() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let secret = read_secret_keys();
    disable_raw_mode()?;
    // Raw mode swallowed the newline
    eprintln!();
    secret
}

fn read_secret_keys() -> io::Result<Option<String>> {
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_secret_key(&mut buffer, key) {
                SecretInput::Editing => {}
                SecretInput::Submit => return Ok(Some(buffer)),
                SecretInput::Cancel => return Ok(None),
            }
        }
    }
}

/// State of a secret being typed after one key event.
#[derive(Debug, PartialEq, Eq)]
enum SecretInput {
    Editing,
    Submit,
    Cancel,
}

fn apply_secret_key(buffer: &mut String, key: KeyEvent) -> SecretInput {
    if key.kind != KeyEventKind::Press {
        return SecretInput::Editing;
    }
    match key.code {
        KeyCode::Enter => SecretInput::Submit,
        KeyCode::Esc => SecretInput::Cancel,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretInput::Cancel
        }
        KeyCode::Backspace => {
            buffer.pop();
            SecretInput::Editing
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            SecretInput::Editing
        }
        _ => SecretInput::Editing,
    }
}

/// Parse a 1-based menu choice.
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn pick(&self, title: &str, items: &[String]) -> Option<usize> {
        if items.is_empty() {
            return None;
        }
        let mut prompt = format!("{}\n", title.cyan().bold());
        for (i, item) in items.iter().enumerate() {
            prompt.push_str(&format!("  {}. {item}\n", i + 1));
        }
        prompt.push_str(&format!("Choice [1-{}]: ", items.len()));

        let answer = Self::ask(prompt, false).await?;
        parse_choice(&answer, items.len())
    }

    async fn input_secret(&self, prompt: &str) -> Option<String> {
        Self::ask(format!("{}: ", prompt.cyan()), true).await
    }

    fn info(&self, message: &str) {
        eprintln!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 2), Some(0));
        assert_eq!(parse_choice(" 2 ", 2), Some(1));
        assert_eq!(parse_choice("0", 2), None);
        assert_eq!(parse_choice("3", 2), None);
        assert_eq!(parse_choice("oauth", 2), None);
    }

    fn type_keys(buffer: &mut String, codes: &[KeyCode]) -> SecretInput {
        let mut state = SecretInput::Editing;
        for code in codes {
            state = apply_secret_key(buffer, KeyEvent::new(*code, KeyModifiers::NONE));
        }
        state
    }

    #[test]
    fn test_secret_keys_edit_and_submit() {
        let mut buffer = String::new();
        let state = type_keys(
            &mut buffer,
            &[
                KeyCode::Char('l'),
                KeyCode::Char('i'),
                KeyCode::Char('x'),
                KeyCode::Backspace,
                KeyCode::Char('n'),
                KeyCode::Enter,
            ],
        );
        assert_eq!(state, SecretInput::Submit);
        assert_eq!(buffer, "lin");
    }

    #[test]
    fn test_secret_input_can_be_cancelled() {
        let mut buffer = String::new();
        assert_eq!(
            type_keys(&mut buffer, &[KeyCode::Char('a'), KeyCode::Esc]),
            SecretInput::Cancel
        );

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_secret_key(&mut buffer, ctrl_c), SecretInput::Cancel);
        assert_eq!(buffer, "a");
    }
}
