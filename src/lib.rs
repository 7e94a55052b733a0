//!
//! ## Design
//!
//! * the interpreter owns all machine state and knows nothing about screens,
//!   keyboards or clocks
//! * one `step()` is one instruction: fetch, decode, execute, then timers
//! * the driver decides how many steps make a frame and how fast frames go
//! * abstract display so can plug alternatives; TUI in-console and plain text
//! * abstract input, so tests can script the keypad
//! * reproducible: random numbers come from a seeded generator owned by the
//!   interpreter, reseeded on reset
//!
//! Model
//!
//! Runner
//!  |-- display, input, run config
//!  |-- interpreter(machine config)
//!  |    |-- memory(font, program)
//!  |    |-- framebuffer
//!  |    `-- instruction set (two-level dispatch table)
//!  `-- main loop
//!       |-- keys = input.poll()
//!       |-- interpreter.step() x cycles_per_frame
//!       |-- interpreter.tick_timers() if timers are external
//!       |-- display.draw(interpreter.framebuffer())
//!       `-- sleep(rest of frame)
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
mod opcodes;
pub mod runner;

pub use config::{MachineConfig, RunConfig, TimerMode};
pub use error::Chip8Error;
pub use framebuffer::Framebuffer;
pub use interpreter::{Chip8Interpreter, StepOutcome};
