//! # interpreter
//!
//! The machine state, and the fetch/decode/execute loop that drives it:
//!  * 4K of RAM, font at 0x000, programs at 0x200
//!  * V0-VF 8-bit registers; VF doubles as the carry/borrow/collision flag
//!  * I, the 12-bit index register
//!  * PC, which starts at 0x200 and wraps at the top of RAM
//!  * a 16-deep call stack, kept outside of RAM
//!  * delay and sound timers, which count down towards zero
//!  * 16 keys, set from outside
//!  * a 64x32 monochrome framebuffer
//!
//! Nothing here blocks. The key-wait instruction rewinds PC and hands control
//! back, so callers keep calling `step` until a key turns up.
use crate::config::{MachineConfig, TimerMode};
use crate::error::Chip8Error;
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::memory::{self, Chip8MemoryMap, MemoryMap, CHIP8_ADDR_MASK, CHIP8_PROGRAM_ADDR};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt::{self, Write};
use std::io;

pub const REG_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: usize = 16;

/// called with the raw instruction word whenever decode finds nothing to run
pub type UnhandledHook = Box<dyn FnMut(u16)>;

/// What a single `step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// the instruction ran
    Executed,
    /// a key-wait instruction found no key down; PC was rewound to retry it
    WaitingForKey,
    /// the word decoded to nothing; it was skipped and reported to the hook
    Unhandled(u16),
}

pub struct Chip8Interpreter<R = StdRng> {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) v: [u8; REG_COUNT],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) sp: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) keys: [bool; KEY_COUNT],
    pub(crate) rng: R,
    config: MachineConfig,
    unhandled_hook: UnhandledHook,
}

impl Chip8Interpreter<StdRng> {
    /// a freshly reset machine with the default config
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }
}

impl Default for Chip8Interpreter<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + SeedableRng> Chip8Interpreter<R> {
    pub fn with_config(config: MachineConfig) -> Self {
        let mut interpreter = Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            framebuffer: Framebuffer::new(),
            v: [0; REG_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; KEY_COUNT],
            rng: R::seed_from_u64(config.seed),
            config,
            unhandled_hook: Box::new(|word| warn!("unhandled operation: {:#06X}", word)),
        };
        interpreter.reset();
        interpreter
    }

    /// put everything back to power-on state, including the random source
    pub fn reset(&mut self) {
        self.memory.reset();
        self.framebuffer.clear();
        self.v = [0; REG_COUNT];
        self.i = 0;
        self.pc = CHIP8_PROGRAM_ADDR;
        self.stack = [0; STACK_SIZE];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; KEY_COUNT];
        self.rng = R::seed_from_u64(self.config.seed);
        debug!("reset, seed {}", self.config.seed);
    }

    /// copy a program in at 0x200. Only the bytes it covers are touched, and
    /// an oversized program leaves the machine exactly as it was.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// load a chip8 program from a file or similar
    pub fn load_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.memory.load_program_from(reader)?;
        debug!("loaded program from reader");
        Ok(())
    }

    /// Execute exactly one instruction, then count the timers down (unless
    /// they are driven externally).
    ///
    /// A stack fault leaves the machine as it was before the call, with PC
    /// still pointing at the offending instruction.
    pub fn step(&mut self) -> Result<StepOutcome, Chip8Error> {
        let fetch_pc = self.pc;
        let instruction = Instruction::new(self.memory.get_word(fetch_pc));
        self.pc = fetch_pc.wrapping_add(2) & CHIP8_ADDR_MASK;
        trace!("{:03X}: {}", fetch_pc & CHIP8_ADDR_MASK, instruction);

        let outcome = match self.execute(instruction) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("fault at {:03X}: {}", fetch_pc & CHIP8_ADDR_MASK, e);
                self.pc = fetch_pc;
                return Err(e);
            }
        };
        if let StepOutcome::Unhandled(word) = outcome {
            (self.unhandled_hook)(word);
        }
        if self.config.timer_mode == TimerMode::PerInstruction {
            self.tick_timers();
        }
        Ok(outcome)
    }

    /// one countdown of both timers, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT]) {
        self.keys = *keys;
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(k) => *k = pressed,
            None => warn!("ignoring state of non-existent key {:#04x}", key),
        }
    }

    pub fn set_unhandled_hook(&mut self, hook: impl FnMut(u16) + 'static) {
        self.unhandled_hook = Box::new(hook);
    }

    /// memory, registers and stack as text, for debugging
    pub fn dump(&self) -> String {
        StateDump(self).to_string()
    }
}

impl<R> Chip8Interpreter<R> {
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    pub fn registers(&self) -> &[u8; REG_COUNT] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// all 16 slots, whether in use or not; see `sp`
    pub fn stack(&self) -> &[u16; STACK_SIZE] {
        &self.stack
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

struct StateDump<'a, R>(&'a Chip8Interpreter<R>);

impl<R> fmt::Display for StateDump<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        let bytes = m.memory.bytes();
        for (addr, word) in bytes.chunks(2).enumerate().map(|(n, w)| (n * 2, w)) {
            if addr % 0x20 == 0 {
                write!(f, "\n0x{:03X}: ", addr)?;
            } else if addr % 0x10 == 0 {
                f.write_str("| ")?;
            }
            write!(f, "{:02X}{:02X} ", word[0], word[1])?;
        }
        f.write_char('\n')?;

        f.write_str("V: ")?;
        for v in m.v.iter() {
            write!(f, "{:04X} ", v)?;
        }
        f.write_char('\n')?;

        f.write_str("Stack: ")?;
        for s in m.stack.iter() {
            write!(f, "{:04X} ", s)?;
        }
        writeln!(f)?;
        write!(
            f,
            "PC: {:04X} I: {:04X} SP: {} DT: {:02X} ST: {:02X}",
            m.pc, m.i, m.sp, m.delay_timer, m.sound_timer
        )
    }
}

/// where the glyph for hex digit `digit` starts
pub(crate) fn font_glyph_addr(digit: u8) -> u16 {
    (memory::CHIP8_FONT_ADDR + digit as u16 * memory::CHIP8_FONT_GLYPH_BYTES) & CHIP8_ADDR_MASK
}
