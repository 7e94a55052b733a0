/// How the delay and sound timers count down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// decrement once after every executed instruction
    #[default]
    PerInstruction,
    /// leave it to whoever drives the interpreter to call `tick_timers` at 60Hz
    External,
}

/// Machine-level settings, fixed for the lifetime of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineConfig {
    /// seed for the random source; re-applied on every reset
    pub seed: u64,
    pub timer_mode: TimerMode,
}

impl MachineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timer_mode(mut self, timer_mode: TimerMode) -> Self {
        self.timer_mode = timer_mode;
        self
    }
}

/// How a driver loop paces the interpreter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    /// instructions executed between frames
    pub cycles_per_frame: u32,
    /// frames per second; 60 matches the timers
    pub frame_rate: f64,
    /// stop after this many frames
    pub max_frames: Option<u64>,
    /// sleep between frames to hold the frame rate
    pub pace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cycles_per_frame: 10,
            frame_rate: 60.0,
            max_frames: None,
            pace: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MachineConfig::default();
        assert_eq!(c.seed, 0);
        assert_eq!(c.timer_mode, TimerMode::PerInstruction);
    }

    #[test]
    fn test_builders() {
        let c = MachineConfig::default()
            .with_seed(42)
            .with_timer_mode(TimerMode::External);
        assert_eq!(c.seed, 42);
        assert_eq!(c.timer_mode, TimerMode::External);
    }

    #[test]
    fn test_run_defaults() {
        let r = RunConfig::default();
        assert_eq!(r.cycles_per_frame, 10);
        assert_eq!(r.frame_rate, 60.0);
        assert_eq!(r.max_frames, None);
        assert!(r.pace);
    }
}
