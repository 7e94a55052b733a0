use crate::interpreter::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// map of keys on the left-hand side of a qwerty keyboard to the COSMAC hex
/// keypad:
///
/// ```text
///  1 2 3 4      1 2 3 C
///  q w e r  =>  4 5 6 D
///  a s d f      7 8 9 E
///  z x c v      A 0 B F
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// terminals only report presses, so a key counts as held for this many
/// polls after its last press (or auto-repeat)
const KEY_HOLD_POLLS: u8 = 6;

/// the keypad as of the latest poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    pub keys: [bool; KEY_COUNT],
    /// the user asked to stop
    pub quit: bool,
}

/// reads keypresses
pub trait Input {
    /// called once per frame
    fn poll(&mut self) -> Result<KeyState, io::Error>;
}

/// keyboard input from a terminal in raw mode, using crossterm
pub struct TerminalInput {
    keymap: HashMap<char, u8>,
    held: [u8; KEY_COUNT],
}

impl TerminalInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
        })
    }

    /// feed one key event in; returns true if it was a request to quit
    fn handle_key(&mut self, evt: KeyEvent) -> bool {
        match evt.code {
            KeyCode::Esc => true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char(key) => {
                match self.keymap.get(&key.to_ascii_lowercase()) {
                    Some(mapped_key) => self.held[*mapped_key as usize] = KEY_HOLD_POLLS,
                    None => debug!("can't map {:?} to a COSMAC key", key),
                }
                false
            }
            _ => false,
        }
    }

    fn state(&self, quit: bool) -> KeyState {
        let mut keys = [false; KEY_COUNT];
        for (k, held) in keys.iter_mut().zip(self.held.iter()) {
            *k = *held > 0;
        }
        KeyState { keys, quit }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TerminalInput {
    fn poll(&mut self) -> Result<KeyState, io::Error> {
        for held in self.held.iter_mut() {
            *held = held.saturating_sub(1);
        }
        let mut quit = false;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                quit |= self.handle_key(evt);
            }
        }
        Ok(self.state(quit))
    }
}

/// Input that replays a fixed sequence of keypads, one per poll, then asks
/// to quit. For testing.
pub struct ScriptedInput {
    frames: VecDeque<[bool; KEY_COUNT]>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<[bool; KEY_COUNT]>) -> Self {
        ScriptedInput {
            frames: VecDeque::from(frames),
        }
    }

    /// no keys down for `n` polls
    pub fn idle(n: usize) -> Self {
        Self::new(vec![[false; KEY_COUNT]; n])
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self) -> Result<KeyState, io::Error> {
        Ok(match self.frames.pop_front() {
            Some(keys) => KeyState { keys, quit: false },
            None => KeyState {
                keys: [false; KEY_COUNT],
                quit: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal_input() -> TerminalInput {
        // skip enabling raw mode; only the mapping is under test
        TerminalInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
        }
    }

    #[test]
    fn test_keymap_is_complete() {
        let keymap = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut seen: Vec<u8> = keymap.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_handle_key() {
        let mut input = terminal_input();
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)));
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('V'), KeyModifiers::SHIFT)));
        let state = input.state(false);
        assert!(state.keys[0xa]);
        assert!(state.keys[0xf]);
        assert_eq!(state.keys.iter().filter(|k| **k).count(), 2);
    }

    #[test]
    fn test_unmapped_key_ignored() {
        let mut input = terminal_input();
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE)));
        assert_eq!(input.state(false).keys, [false; KEY_COUNT]);
    }

    #[test]
    fn test_quit_keys() {
        let mut input = terminal_input();
        assert!(input.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_scripted_input() -> Result<(), io::Error> {
        let mut down = [false; KEY_COUNT];
        down[5] = true;
        let mut input = ScriptedInput::new(vec![down]);
        assert_eq!(input.poll()?, KeyState { keys: down, quit: false });
        assert!(input.poll()?.quit);
        Ok(())
    }
}
