// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Terminal frontend. While idle, commands are read line by line; while
//! armed, the terminal switches to raw mode and every key press and release
//! is delivered as a dispatch event. Escape disarms.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crossterm::event::{
    self, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal;
use tracing::warn;

use crate::sampler::{Key, LoopMode, SampleConfig};
use crate::settings::WindowGeometry;
use crate::state::STATE_FILE_EXTENSION;

use super::Event;

const ARM: &str = "start";
const DISARM: &str = "stop";
const ADD: &str = "add";
const EDIT: &str = "edit";
const REMOVE: &str = "remove";
const CLEAR: &str = "clear";
const SAVE: &str = "save";
const LOAD: &str = "load";
const LIST: &str = "list";
const SELECT: &str = "select";
const NEXT: &str = "next";
const PREV: &str = "prev";
const VOLUME: &str = "vol";
const PAN: &str = "pan";
const QUIT: &str = "quit";

/// Parses one idle-mode command line. Returns `None` for unrecognized
/// input, which the driver reports and skips.
fn parse_command(line: &str) -> Option<Event> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_lowercase();
    let argument = words.next();

    let event = match command.as_str() {
        ARM => Event::Arm,
        DISARM => Event::Disarm,
        ADD => Event::AddSample,
        EDIT => Event::EditSample,
        REMOVE | "rm" => Event::RemoveSample,
        CLEAR => Event::ClearState,
        SAVE => Event::SaveState,
        LOAD | "restore" => Event::RestoreState,
        LIST | "ls" => Event::ListSamples,
        SELECT => Event::Select(argument?.parse().ok()?),
        NEXT => Event::SelectNext,
        PREV => Event::SelectPrev,
        VOLUME => Event::SetVolume(argument?.parse().ok()?),
        PAN => Event::SetPan(argument?.parse().ok()?),
        QUIT | "exit" => Event::Quit,
        _ => return None,
    };
    Some(event)
}

/// Maps a terminal key event to a dispatch event. Escape disarms; keys with
/// no sampler mapping are ignored.
fn dispatch_event(key_event: KeyEvent) -> Option<Event> {
    if key_event.code == KeyCode::Esc {
        return match key_event.kind {
            KeyEventKind::Press => Some(Event::Disarm),
            _ => None,
        };
    }

    let key = match key_event.code {
        KeyCode::Char(c) => Key::from_char(c),
        KeyCode::F(n) => Key::function(n),
        _ => return None,
    };

    match key_event.kind {
        KeyEventKind::Press => Some(Event::KeyDown { key, repeat: false }),
        KeyEventKind::Repeat => Some(Event::KeyDown { key, repeat: true }),
        KeyEventKind::Release => Some(Event::KeyUp { key, repeat: false }),
    }
}

/// An event driver reading from the controlling terminal.
pub struct Events {
    raw: bool,
}

impl Events {
    pub fn new() -> Events {
        Events { raw: false }
    }

    /// Grabs the keyboard: raw mode plus release/repeat reporting.
    fn grab(&mut self) -> io::Result<()> {
        if !self.raw {
            terminal::enable_raw_mode()?;
            crossterm::execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.raw = true;
            println!("Armed. Press Esc to stop.\r");
        }
        Ok(())
    }

    /// Releases the keyboard and returns to line input.
    fn release(&mut self) -> io::Result<()> {
        if self.raw {
            crossterm::execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            terminal::disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }

    fn next_command(&mut self) -> io::Result<Option<Event>> {
        print!(
            "Command ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}): ",
            ARM, ADD, EDIT, REMOVE, CLEAR, SAVE, LOAD, LIST, VOLUME, QUIT,
        );
        io::stdout().flush()?;

        let mut input = String::default();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None); // EOF
        }
        if input.trim().is_empty() {
            return Ok(Some(Event::ListSamples));
        }

        match parse_command(&input) {
            Some(event) => Ok(Some(event)),
            None => {
                warn!(input = input.trim(), "Unrecognized input");
                Ok(Some(Event::ListSamples))
            }
        }
    }

    fn next_key(&mut self) -> io::Result<Option<Event>> {
        loop {
            if let event::Event::Key(key_event) = event::read()? {
                if let Some(event) = dispatch_event(key_event) {
                    return Ok(Some(event));
                }
            }
        }
    }
}

impl Default for Events {
    fn default() -> Events {
        Events::new()
    }
}

impl super::Driver for Events {
    fn next_event(&mut self, armed: bool) -> io::Result<Option<Event>> {
        if armed {
            self.grab()?;
            self.next_key()
        } else {
            self.release()?;
            self.next_command()
        }
    }
}

impl Drop for Events {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(err = %e, "Unable to restore the terminal");
        }
    }
}

/// Line-oriented prompts standing in for dialogs.
pub struct Prompts {}

impl Prompts {
    pub fn new() -> Prompts {
        Prompts {}
    }

    /// Prompts once, offering a default. Empty input takes the default;
    /// `None` means there was no input left to read.
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Option<String> {
        match default {
            Some(default) => print!("{} [{}]: ", prompt, default),
            None => print!("{}: ", prompt),
        }
        if io::stdout().flush().is_err() {
            return None;
        }

        let mut input = String::default();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }

        let input = input.trim();
        if input.is_empty() {
            return default.map(String::from);
        }
        Some(input.to_string())
    }

    fn ask_path(&mut self, prompt: &str, start_dir: &Path) -> Option<PathBuf> {
        let input = self.ask(&format!("{} (from {})", prompt, start_dir.display()), None)?;
        let path = PathBuf::from(&input);
        if path.is_absolute() {
            Some(path)
        } else {
            Some(start_dir.join(path))
        }
    }
}

impl Default for Prompts {
    fn default() -> Prompts {
        Prompts::new()
    }
}

impl super::Prompter for Prompts {
    fn sample_config(&mut self, existing: Option<&SampleConfig>) -> Option<SampleConfig> {
        let name = self.ask("Name", existing.map(|c| c.name.as_str()))?;

        let file = loop {
            let default = existing.map(|c| c.file.display().to_string());
            let input = self.ask("Sound file", default.as_deref())?;
            let path = PathBuf::from(&input);
            if path.is_file() {
                break path;
            }
            println!("No such file: {}", path.display());
        };

        let key = loop {
            let default = existing.map(|c| c.key.to_string());
            let input = self.ask("Trigger key", default.as_deref())?;
            match input.parse::<Key>() {
                Ok(key) => break key,
                Err(e) => println!("{}", e),
            }
        };

        let loop_mode = loop {
            let default = existing.map(|c| c.loop_mode.to_string());
            let input = self.ask("Loop mode (one-shot, auto-loop)", default.as_deref())?;
            match input.parse::<LoopMode>() {
                Ok(loop_mode) => break loop_mode,
                Err(e) => println!("{}", e),
            }
        };

        Some(SampleConfig {
            name,
            file,
            key,
            loop_mode,
        })
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        matches!(
            self.ask(&format!("{} (y/n)", prompt), Some("n")).as_deref(),
            Some("y") | Some("yes") | Some("Y")
        )
    }

    fn save_path(&mut self, start_dir: &Path) -> Option<PathBuf> {
        self.ask_path(
            &format!("Save state as (.{})", STATE_FILE_EXTENSION),
            start_dir,
        )
    }

    fn open_path(&mut self, start_dir: &Path) -> Option<PathBuf> {
        loop {
            let path = self.ask_path("State file to load", start_dir)?;
            if path.is_file() {
                return Some(path);
            }
            println!("No such file: {}", path.display());
        }
    }

    fn error(&mut self, message: &str) {
        println!("Error: {}", message);
    }
}

/// The current terminal size, if it can be determined.
pub fn window_geometry() -> Option<WindowGeometry> {
    terminal::size()
        .ok()
        .map(|(columns, rows)| WindowGeometry { columns, rows })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("start"), Some(Event::Arm));
        assert_eq!(parse_command("  STOP  "), Some(Event::Disarm));
        assert_eq!(parse_command("add"), Some(Event::AddSample));
        assert_eq!(parse_command("edit"), Some(Event::EditSample));
        assert_eq!(parse_command("rm"), Some(Event::RemoveSample));
        assert_eq!(parse_command("clear"), Some(Event::ClearState));
        assert_eq!(parse_command("save"), Some(Event::SaveState));
        assert_eq!(parse_command("restore"), Some(Event::RestoreState));
        assert_eq!(parse_command("ls"), Some(Event::ListSamples));
        assert_eq!(parse_command("select 3"), Some(Event::Select(3)));
        assert_eq!(parse_command("next"), Some(Event::SelectNext));
        assert_eq!(parse_command("prev"), Some(Event::SelectPrev));
        assert_eq!(parse_command("vol 75"), Some(Event::SetVolume(75)));
        assert_eq!(parse_command("pan -40"), Some(Event::SetPan(-40)));
        assert_eq!(parse_command("exit"), Some(Event::Quit));
    }

    #[test]
    fn test_parse_command_rejects_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("unrecognized"), None);
        assert_eq!(parse_command("select"), None);
        assert_eq!(parse_command("select x"), None);
        assert_eq!(parse_command("vol loud"), None);
    }

    #[test]
    fn test_dispatch_event() {
        use crossterm::event::{KeyEventState, KeyModifiers};

        let press = |code| KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        let release = |code| KeyEvent {
            kind: KeyEventKind::Release,
            ..press(code)
        };
        let repeat = |code| KeyEvent {
            kind: KeyEventKind::Repeat,
            ..press(code)
        };

        assert_eq!(
            dispatch_event(press(KeyCode::Char('a'))),
            Some(Event::KeyDown {
                key: Key::from_char('a'),
                repeat: false,
            })
        );
        assert_eq!(
            dispatch_event(repeat(KeyCode::Char('a'))),
            Some(Event::KeyDown {
                key: Key::from_char('a'),
                repeat: true,
            })
        );
        assert_eq!(
            dispatch_event(release(KeyCode::F(5))),
            Some(Event::KeyUp {
                key: Key::function(5),
                repeat: false,
            })
        );
        assert_eq!(dispatch_event(press(KeyCode::Esc)), Some(Event::Disarm));
        assert_eq!(dispatch_event(release(KeyCode::Esc)), None);
        assert_eq!(dispatch_event(press(KeyCode::Enter)), None);
    }

    // Uppercase input maps to the same key as lowercase: shifted presses
    // still hit the bound sample.
    #[test]
    fn test_dispatch_event_folds_case() {
        use crossterm::event::{KeyEventState, KeyModifiers};

        let event = dispatch_event(KeyEvent {
            code: KeyCode::Char('A'),
            modifiers: KeyModifiers::SHIFT,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert_eq!(
            event,
            Some(Event::KeyDown {
                key: Key::from_char('a'),
                repeat: false,
            })
        );
    }
}
