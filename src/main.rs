use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;

use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TerminalInput;
use chip8vm::runner::Runner;
use chip8vm::{Chip8Interpreter, MachineConfig, RunConfig, StepOutcome, TimerMode};

#[derive(Parser, Debug)]
#[command(name = "chip8vm")]
#[command(about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to a CHIP-8 program image
    rom: PathBuf,

    /// Run without a terminal UI and print the screen when done
    #[arg(long)]
    headless: bool,

    /// Instructions to execute in headless mode
    #[arg(long, default_value_t = 300)]
    steps: u64,

    /// Instructions executed per 60Hz frame
    #[arg(long, default_value_t = 10)]
    cycles_per_frame: u32,

    /// Stop after this many frames (0 runs until Esc)
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Seed for the random number instruction
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Count timers down once per frame instead of once per instruction
    #[arg(long)]
    frame_timers: bool,

    /// Print memory, registers and stack on exit (headless only)
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let timer_mode = if args.frame_timers {
        TimerMode::External
    } else {
        TimerMode::PerInstruction
    };
    let config = MachineConfig::default()
        .with_seed(args.seed)
        .with_timer_mode(timer_mode);
    let mut interpreter: Chip8Interpreter = Chip8Interpreter::with_config(config);

    // load a program
    let mut f = File::open(&args.rom).with_context(|| format!("opening {}", args.rom.display()))?;
    interpreter
        .load_from(&mut f)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    info!("loaded {}", args.rom.display());

    if args.headless {
        run_headless(&mut interpreter, &args)
    } else {
        run_terminal(&mut interpreter, &args)
    }
}

fn run_headless(interpreter: &mut Chip8Interpreter, args: &Args) -> Result<()> {
    for n in 0..args.steps {
        let outcome = interpreter.step().with_context(|| format!("step {}", n))?;
        if outcome == StepOutcome::WaitingForKey {
            warn!("program is waiting for a key; no keypad in headless mode");
            break;
        }
    }
    if args.dump {
        println!("{}", interpreter.dump());
    }
    print!("{}", interpreter.framebuffer());
    Ok(())
}

fn run_terminal(interpreter: &mut Chip8Interpreter, args: &Args) -> Result<()> {
    let mut display = MonoTermDisplay::new().context("setting up the terminal display")?;
    let mut input = TerminalInput::new().context("setting up the keyboard")?;
    let run_config = RunConfig {
        cycles_per_frame: args.cycles_per_frame,
        max_frames: (args.frames > 0).then_some(args.frames),
        ..RunConfig::default()
    };
    let summary = Runner::new(interpreter, &mut display, &mut input, run_config).main_loop()?;
    info!(
        "ran {} frames, {} instructions ({} unhandled)",
        summary.frames, summary.steps, summary.unhandled
    );
    Ok(())
}
