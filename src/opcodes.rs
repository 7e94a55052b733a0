//! The instruction set, as a two-level dispatch table.
//!
//! The top nibble of every word indexes `FAMILIES`. Families that pack
//! several operations behind one nibble hand off to a second table keyed
//! by the trailing nibble (ALU ops) or the low byte (keys, timers, memory).
//!
//! VF is both a general register and the flag register. Wherever an
//! instruction sets both VX and VF, the flag is written first and the data
//! second, so with X = F the data result is what survives.
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::interpreter::{font_glyph_addr, Chip8Interpreter, StepOutcome, KEY_COUNT, STACK_SIZE};
use crate::memory::{MemoryMap, CHIP8_ADDR_MASK};
use rand::{Rng, RngCore, SeedableRng};

type Handler<R> = fn(&mut Chip8Interpreter<R>, Instruction) -> Result<StepOutcome, Chip8Error>;

const FLAG: usize = 0xf;

impl<R: RngCore + SeedableRng> Chip8Interpreter<R> {
    const FAMILIES: [Handler<R>; 16] = [
        Self::family_0,
        Self::op_1nnn,
        Self::op_2nnn,
        Self::op_3xkk,
        Self::op_4xkk,
        Self::op_5xy0,
        Self::op_6xkk,
        Self::op_7xkk,
        Self::family_8,
        Self::op_9xy0,
        Self::op_annn,
        Self::op_bnnn,
        Self::op_cxkk,
        Self::op_dxyn,
        Self::family_e,
        Self::family_f,
    ];

    /// 0x0nnn, keyed by the whole word; other machine code calls aren't supported
    const SYSTEM: [(u16, Handler<R>); 2] = [(0x00e0, Self::op_00e0), (0x00ee, Self::op_00ee)];

    /// 0x8xyN, keyed by N
    const ALU: [Option<Handler<R>>; 16] = [
        Some(Self::op_8xy0),
        Some(Self::op_8xy1),
        Some(Self::op_8xy2),
        Some(Self::op_8xy3),
        Some(Self::op_8xy4),
        Some(Self::op_8xy5),
        Some(Self::op_8xy6),
        Some(Self::op_8xy7),
        None,
        None,
        None,
        None,
        None,
        None,
        Some(Self::op_8xye),
        None,
    ];

    /// 0xExkk, keyed by kk
    const KEYS: [(u16, Handler<R>); 2] = [(0x9e, Self::op_ex9e), (0xa1, Self::op_exa1)];

    /// 0xFxkk, keyed by kk
    const MISC: [(u16, Handler<R>); 9] = [
        (0x07, Self::op_fx07),
        (0x0a, Self::op_fx0a),
        (0x15, Self::op_fx15),
        (0x18, Self::op_fx18),
        (0x1e, Self::op_fx1e),
        (0x29, Self::op_fx29),
        (0x33, Self::op_fx33),
        (0x55, Self::op_fx55),
        (0x65, Self::op_fx65),
    ];

    /// run one already-fetched instruction; PC has been moved past it
    pub(crate) fn execute(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        Self::FAMILIES[ins.family()](self, ins)
    }

    fn lookup(
        &mut self,
        table: &[(u16, Handler<R>)],
        key: u16,
        ins: Instruction,
    ) -> Result<StepOutcome, Chip8Error> {
        match table.iter().find(|(k, _)| *k == key) {
            Some((_, handler)) => handler(self, ins),
            None => Ok(StepOutcome::Unhandled(ins.word)),
        }
    }

    fn family_0(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.lookup(&Self::SYSTEM, ins.word, ins)
    }

    fn family_8(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        match Self::ALU[ins.n() as usize] {
            Some(handler) => handler(self, ins),
            None => Ok(StepOutcome::Unhandled(ins.word)),
        }
    }

    fn family_e(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.lookup(&Self::KEYS, ins.kk() as u16, ins)
    }

    fn family_f(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.lookup(&Self::MISC, ins.kk() as u16, ins)
    }

    /// move past the next instruction
    fn skip_if(&mut self, cond: bool) -> Result<StepOutcome, Chip8Error> {
        if cond {
            self.pc = self.pc.wrapping_add(2) & CHIP8_ADDR_MASK;
        }
        Ok(StepOutcome::Executed)
    }

    /// address of the instruction being executed, for error reports
    fn current_pc(&self) -> u16 {
        self.pc.wrapping_sub(2) & CHIP8_ADDR_MASK
    }

    fn key_down(&self, x: usize) -> bool {
        self.keys[self.v[x] as usize % KEY_COUNT]
    }

    /// CLS
    fn op_00e0(&mut self, _ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.framebuffer.clear();
        Ok(StepOutcome::Executed)
    }

    /// RET
    fn op_00ee(&mut self, _ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { pc: self.current_pc() });
        }
        self.sp -= 1;
        self.pc = self.stack[self.sp];
        Ok(StepOutcome::Executed)
    }

    /// JP addr
    fn op_1nnn(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.pc = ins.nnn();
        Ok(StepOutcome::Executed)
    }

    /// CALL addr
    fn op_2nnn(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow { pc: self.current_pc() });
        }
        self.stack[self.sp] = self.pc;
        self.sp += 1;
        self.pc = ins.nnn();
        Ok(StepOutcome::Executed)
    }

    /// SE Vx, byte
    fn op_3xkk(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(self.v[ins.x()] == ins.kk())
    }

    /// SNE Vx, byte
    fn op_4xkk(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(self.v[ins.x()] != ins.kk())
    }

    /// SE Vx, Vy
    fn op_5xy0(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(self.v[ins.x()] == self.v[ins.y()])
    }

    /// LD Vx, byte
    fn op_6xkk(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] = ins.kk();
        Ok(StepOutcome::Executed)
    }

    /// ADD Vx, byte; VF untouched
    fn op_7xkk(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] = self.v[ins.x()].wrapping_add(ins.kk());
        Ok(StepOutcome::Executed)
    }

    /// LD Vx, Vy
    fn op_8xy0(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] = self.v[ins.y()];
        Ok(StepOutcome::Executed)
    }

    /// OR Vx, Vy
    fn op_8xy1(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] |= self.v[ins.y()];
        Ok(StepOutcome::Executed)
    }

    /// AND Vx, Vy
    fn op_8xy2(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] &= self.v[ins.y()];
        Ok(StepOutcome::Executed)
    }

    /// XOR Vx, Vy
    fn op_8xy3(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] ^= self.v[ins.y()];
        Ok(StepOutcome::Executed)
    }

    /// ADD Vx, Vy; VF = carry
    fn op_8xy4(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let sum = self.v[ins.x()] as u16 + self.v[ins.y()] as u16;
        self.v[FLAG] = (sum > 0xff) as u8; // flag
        self.v[ins.x()] = sum as u8; // data
        Ok(StepOutcome::Executed)
    }

    /// SUB Vx, Vy; VF = not borrow
    fn op_8xy5(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let (vx, vy) = (self.v[ins.x()], self.v[ins.y()]);
        self.v[FLAG] = (vx > vy) as u8; // flag
        self.v[ins.x()] = vx.wrapping_sub(vy); // data
        Ok(StepOutcome::Executed)
    }

    /// SHR Vx; VF = bit shifted out
    fn op_8xy6(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let vx = self.v[ins.x()];
        self.v[FLAG] = vx & 0x01; // flag
        self.v[ins.x()] = vx >> 1; // data
        Ok(StepOutcome::Executed)
    }

    /// SUBN Vx, Vy; VF = not borrow
    fn op_8xy7(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let (vx, vy) = (self.v[ins.x()], self.v[ins.y()]);
        self.v[FLAG] = (vy > vx) as u8; // flag
        self.v[ins.x()] = vy.wrapping_sub(vx); // data
        Ok(StepOutcome::Executed)
    }

    /// SHL Vx; VF = bit shifted out
    fn op_8xye(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let vx = self.v[ins.x()];
        self.v[FLAG] = vx >> 7; // flag
        self.v[ins.x()] = vx << 1; // data
        Ok(StepOutcome::Executed)
    }

    /// SNE Vx, Vy
    fn op_9xy0(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(self.v[ins.x()] != self.v[ins.y()])
    }

    /// LD I, addr
    fn op_annn(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.i = ins.nnn();
        Ok(StepOutcome::Executed)
    }

    /// JP V0, addr; fetch wraps the result
    fn op_bnnn(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.pc = ins.nnn() + self.v[0] as u16;
        Ok(StepOutcome::Executed)
    }

    /// RND Vx, byte
    fn op_cxkk(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let byte: u8 = self.rng.gen();
        self.v[ins.x()] = byte & ins.kk();
        Ok(StepOutcome::Executed)
    }

    /// DRW Vx, Vy, nibble; VF = collision
    fn op_dxyn(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let x = self.v[ins.x()] as usize;
        let y = self.v[ins.y()] as usize;
        self.v[FLAG] = 0;
        let mut collision = false;
        for row in 0..ins.n() as u16 {
            let data = self.memory.read_byte(self.i.wrapping_add(row));
            collision |= self.framebuffer.xor_row(x, y + row as usize, data);
        }
        self.v[FLAG] = collision as u8;
        Ok(StepOutcome::Executed)
    }

    /// SKP Vx
    fn op_ex9e(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(self.key_down(ins.x()))
    }

    /// SKNP Vx
    fn op_exa1(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.skip_if(!self.key_down(ins.x()))
    }

    /// LD Vx, DT
    fn op_fx07(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.v[ins.x()] = self.delay_timer;
        Ok(StepOutcome::Executed)
    }

    /// LD Vx, K; the lowest numbered key down wins
    fn op_fx0a(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        match self.keys.iter().position(|k| *k) {
            Some(key) => {
                self.v[ins.x()] = key as u8;
                Ok(StepOutcome::Executed)
            }
            None => {
                self.pc = self.current_pc();
                Ok(StepOutcome::WaitingForKey)
            }
        }
    }

    /// LD DT, Vx
    fn op_fx15(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.delay_timer = self.v[ins.x()];
        Ok(StepOutcome::Executed)
    }

    /// LD ST, Vx
    fn op_fx18(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.sound_timer = self.v[ins.x()];
        Ok(StepOutcome::Executed)
    }

    /// ADD I, Vx; VF = sum left the 12-bit range
    fn op_fx1e(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let sum = self.i + self.v[ins.x()] as u16;
        self.v[FLAG] = (sum > CHIP8_ADDR_MASK) as u8;
        self.i = sum & CHIP8_ADDR_MASK;
        Ok(StepOutcome::Executed)
    }

    /// LD F, Vx
    fn op_fx29(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        self.i = font_glyph_addr(self.v[ins.x()]);
        Ok(StepOutcome::Executed)
    }

    /// LD B, Vx
    fn op_fx33(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let vx = self.v[ins.x()];
        self.memory.write(&[vx / 100, (vx / 10) % 10, vx % 10], self.i);
        Ok(StepOutcome::Executed)
    }

    /// LD [I], V0..=Vx; I is left where it was
    fn op_fx55(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        let regs = self.v;
        self.memory.write(&regs[..=ins.x()], self.i);
        Ok(StepOutcome::Executed)
    }

    /// LD V0..=Vx, [I]; I is left where it was
    fn op_fx65(&mut self, ins: Instruction) -> Result<StepOutcome, Chip8Error> {
        for n in 0..=ins.x() {
            self.v[n] = self.memory.read_byte(self.i.wrapping_add(n as u16));
        }
        Ok(StepOutcome::Executed)
    }
}
