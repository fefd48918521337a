use crate::interpreter::Status;
use ansi_term::Style;
use linefeed::{DefaultTerminal, Interface, ReadResult, Terminal};
use std::path::PathBuf;

pub fn setup() -> std::io::Result<Interface<DefaultTerminal>> {
    let interface = linefeed::Interface::new("schemer")?;
    interface.set_prompt("> ")?;
    if let Some(path) = history_path() {
        interface.load_history(path).ok();
    };
    Ok(interface)
}

fn history_path() -> Option<PathBuf> {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push(".schemer_history");
            Some(path)
        }
        None => None,
    }
}

pub fn save_history<T: Terminal>(interface: &Interface<T>) -> std::io::Result<()> {
    match history_path() {
        Some(path) => interface.save_history(path),
        None => Ok(()),
    }
}

pub struct Styles {
    pub error: Style,
    pub warn: Style,
}

pub fn styles() -> Styles {
    if atty::is(atty::Stream::Stdout) {
        Styles {
            error: Style::new().fg(ansi_term::Color::Red).bold(),
            warn: Style::new().fg(ansi_term::Color::Yellow),
        }
    } else {
        Styles {
            error: Style::new(),
            warn: Style::new(),
        }
    }
}

pub fn repl<T, F>(interface: &Interface<T>, mut processor: F)
where
    T: Terminal,
    F: FnMut(&str) -> Status,
{
    let styles = styles();
    loop {
        match interface.read_line() {
            Ok(ReadResult::Eof) => break,
            Ok(ReadResult::Signal(sig)) => {
                let msg = format!("Received signal {:?}", sig);
                writeln!(interface, "{}", styles.warn.paint(msg)).ok();
            }
            Ok(ReadResult::Input(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                interface.add_history_unique(line.clone());
                if processor(&line) == Status::Exited {
                    break;
                }
            }
            Err(e) => {
                writeln!(interface, "Error: {}", e).ok();
            }
        }
    }
}
