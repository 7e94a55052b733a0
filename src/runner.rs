//! The environment around an interpreter: one frame at a time it reads the
//! keypad, runs a burst of instructions, counts the timers down if they
//! aren't counted per instruction, redraws, then sleeps off whatever is
//! left of the frame.
use crate::config::{RunConfig, TimerMode};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::interpreter::{Chip8Interpreter, StepOutcome};
use log::{debug, info};
use rand::{RngCore, SeedableRng};
use std::time::{Duration, Instant};

/// what a run got through before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub steps: u64,
    pub unhandled: u64,
}

pub struct Runner<'a, R> {
    interpreter: &'a mut Chip8Interpreter<R>,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: RunConfig,
}

impl<'a, R: RngCore + SeedableRng> Runner<'a, R> {
    pub fn new(
        interpreter: &'a mut Chip8Interpreter<R>,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: RunConfig,
    ) -> Self {
        Runner {
            interpreter,
            display,
            input,
            config,
        }
    }

    /// run frames until the input asks to quit, the frame limit is reached
    /// or the program faults
    pub fn main_loop(&mut self) -> Result<RunSummary, Chip8Error> {
        let frame_time = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        let mut summary = RunSummary::default();
        info!(
            "running at {} instructions per frame, {} frames per second",
            self.config.cycles_per_frame, self.config.frame_rate
        );

        while self.config.max_frames.map_or(true, |max| summary.frames < max) {
            let start = Instant::now();
            let keys = self.input.poll()?;
            if keys.quit {
                debug!("quit requested after {} frames", summary.frames);
                break;
            }
            self.interpreter.set_keys(&keys.keys);
            self.run_frame(&mut summary)?;
            self.display.draw(self.interpreter.framebuffer())?;
            summary.frames += 1;

            if self.config.pace {
                if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
                    spin_sleep::sleep(rest);
                }
            }
        }
        Ok(summary)
    }

    fn run_frame(&mut self, summary: &mut RunSummary) -> Result<(), Chip8Error> {
        for _ in 0..self.config.cycles_per_frame {
            let outcome = self.interpreter.step()?;
            summary.steps += 1;
            match outcome {
                // a key wait keeps retrying so per-instruction timers run at full rate
                StepOutcome::Executed | StepOutcome::WaitingForKey => {}
                StepOutcome::Unhandled(_) => summary.unhandled += 1,
            }
        }
        if self.interpreter.config().timer_mode == TimerMode::External {
            self.interpreter.tick_timers();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::display::TextDisplay;
    use crate::input::ScriptedInput;
    use crate::interpreter::KEY_COUNT;

    fn config(max_frames: Option<u64>) -> RunConfig {
        RunConfig {
            cycles_per_frame: 4,
            frame_rate: 60.0,
            max_frames,
            pace: false,
        }
    }

    #[test]
    fn test_runs_until_quit() -> Result<(), Chip8Error> {
        let mut m = Chip8Interpreter::new();
        m.load(&[0x12, 0x00])?; // spin
        let mut display = TextDisplay::new(Vec::new());
        let mut input = ScriptedInput::idle(3);
        let summary = Runner::new(&mut m, &mut display, &mut input, config(None)).main_loop()?;
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.steps, 12);
        assert_eq!(display.frames(), 3);
        Ok(())
    }

    #[test]
    fn test_frame_limit() -> Result<(), Chip8Error> {
        let mut m = Chip8Interpreter::new();
        m.load(&[0x12, 0x00])?;
        let mut display = TextDisplay::new(Vec::new());
        let mut input = ScriptedInput::idle(10);
        let summary = Runner::new(&mut m, &mut display, &mut input, config(Some(2))).main_loop()?;
        assert_eq!(summary.frames, 2);
        Ok(())
    }

    #[test]
    fn test_key_reaches_program() -> Result<(), Chip8Error> {
        // LD V3, K ; LD F, V3 ; DRW V0, V0, 5 ; JP 0x206
        let mut m = Chip8Interpreter::new();
        m.load(&[0xf3, 0x0a, 0xf3, 0x29, 0xd0, 0x05, 0x12, 0x06])?;
        let mut down = [false; KEY_COUNT];
        down[0x7] = true;
        let mut input = ScriptedInput::new(vec![[false; KEY_COUNT], down]);
        let mut display = TextDisplay::new(Vec::new());
        let summary = Runner::new(&mut m, &mut display, &mut input, config(None)).main_loop()?;
        // the first frame spent all its cycles waiting
        assert_eq!(summary.steps, 4 + 4);
        assert_eq!(m.registers()[3], 7);
        assert_eq!(m.index(), 7 * 5);
        // top row of the '7' glyph
        assert!(m.framebuffer().pixel(0, 0));
        assert!(m.framebuffer().pixel(3, 0));
        assert!(!m.framebuffer().pixel(4, 0));
        Ok(())
    }

    #[test]
    fn test_external_timers_tick_per_frame() -> Result<(), Chip8Error> {
        let machine_config = MachineConfig::default().with_timer_mode(TimerMode::External);
        let mut m: Chip8Interpreter = Chip8Interpreter::with_config(machine_config);
        // LD V0, 30 ; LD DT, V0 ; JP 0x204
        m.load(&[0x60, 0x1e, 0xf0, 0x15, 0x12, 0x04])?;
        let mut display = TextDisplay::new(Vec::new());
        let mut input = ScriptedInput::idle(5);
        Runner::new(&mut m, &mut display, &mut input, config(None)).main_loop()?;
        assert_eq!(m.delay_timer(), 25);
        Ok(())
    }

    #[test]
    fn test_timers_run_while_waiting_for_key() -> Result<(), Chip8Error> {
        let mut m = Chip8Interpreter::new();
        // LD V0, 30 ; LD DT, V0 ; LD V1, K
        m.load(&[0x60, 0x1e, 0xf0, 0x15, 0xf1, 0x0a])?;
        let mut display = TextDisplay::new(Vec::new());
        let mut input = ScriptedInput::idle(3);
        let summary = Runner::new(&mut m, &mut display, &mut input, config(None)).main_loop()?;
        assert_eq!(summary.steps, 12);
        // one tick after LD DT, then one per waiting step
        assert_eq!(m.delay_timer(), 30 - 1 - 10);
        assert_eq!(m.pc(), 0x204);
        Ok(())
    }

    #[test]
    fn test_fault_stops_run() {
        let mut m = Chip8Interpreter::new();
        m.load(&[0x00, 0xee]).unwrap();
        let mut display = TextDisplay::new(Vec::new());
        let mut input = ScriptedInput::idle(5);
        let res = Runner::new(&mut m, &mut display, &mut input, config(None)).main_loop();
        assert!(matches!(res, Err(Chip8Error::StackUnderflow { .. })));
        assert_eq!(display.frames(), 0);
    }
}
