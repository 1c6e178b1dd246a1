use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, IsTerminal, Write};

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(line: &mut String, key: KeyEvent) -> KeyOutcome {
    if matches!(key.kind, KeyEventKind::Release) {
        return KeyOutcome::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Done,
        KeyCode::Esc => KeyOutcome::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancelled
        }
        KeyCode::Backspace => {
            line.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            line.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Prints `label` and reads one line from stdin.
pub fn read_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

/// Like [`read_line`], but keystrokes are not echoed when stdin is a
/// terminal. Piped input is read as a plain line.
pub fn read_hidden(label: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return read_line(label);
    }
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    let outcome = {
        let _raw = RawModeGuard::enter()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut line, key) {
                    KeyOutcome::Continue => {}
                    done => break done,
                }
            }
        }
    };
    println!();

    match outcome {
        KeyOutcome::Cancelled => Err(io::Error::new(
            io::ErrorKind::Interrupted,
            "input cancelled",
        )),
        _ => Ok(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typed_characters_build_the_line() {
        let mut line = String::new();
        for c in "hunter2".chars() {
            assert_eq!(apply_key(&mut line, press(KeyCode::Char(c))), KeyOutcome::Continue);
        }
        assert_eq!(apply_key(&mut line, press(KeyCode::Backspace)), KeyOutcome::Continue);
        assert_eq!(apply_key(&mut line, press(KeyCode::Enter)), KeyOutcome::Done);
        assert_eq!(line, "hunter");
    }

    #[test]
    fn ctrl_c_and_escape_cancel() {
        let mut line = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut line, ctrl_c), KeyOutcome::Cancelled);
        assert_eq!(apply_key(&mut line, press(KeyCode::Esc)), KeyOutcome::Cancelled);
        assert!(line.is_empty());
    }

    #[test]
    fn key_release_is_ignored() {
        let mut line = String::new();
        let release = KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: crossterm::event::KeyEventState::NONE,
        };
        assert_eq!(apply_key(&mut line, release), KeyOutcome::Continue);
        assert!(line.is_empty());
    }
}
