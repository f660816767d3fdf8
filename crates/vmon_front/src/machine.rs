//! A small 6502 style machine used to drive the monitor. It only knows a handful of
//! instructions, but enough to run loops and subroutines, and to hit breakpoints and
//! watchpoints.

use vmon_core::{Host, HostError, Monitor, Resume, Timing};
use vmon_util::{Addr, MemSpace, Op, Reg};

const CYCLES_PER_LINE: u64 = 63;
const LINES_PER_FRAME: u64 = 312;

/// The size of the RAM of the disk drive. It's mirrored through the whole memspace.
const DRIVE_RAM_SIZE: usize = 0x800;

/// Instructions run by a single 'goto' before giving up and entering the monitor.
const RUN_LIMIT: u64 = 10_000_000;

const FLAG_ZERO: u8 = 1 << 1;
const FLAG_NEGATIVE: u8 = 1 << 7;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Implied,
    Immediate,
    Absolute,
    AbsoluteX,
    Relative,
}

impl Mode {
    fn len(self) -> u16 {
        match self {
            Mode::Implied => 1,
            Mode::Immediate | Mode::Relative => 2,
            Mode::Absolute | Mode::AbsoluteX => 3,
        }
    }
}

const OPCODES: [(u8, &str, Mode); 15] = [
    (0x00, "BRK", Mode::Implied),
    (0xea, "NOP", Mode::Implied),
    (0xa9, "LDA", Mode::Immediate),
    (0xad, "LDA", Mode::Absolute),
    (0xbd, "LDA", Mode::AbsoluteX),
    (0x8d, "STA", Mode::Absolute),
    (0x9d, "STA", Mode::AbsoluteX),
    (0xa2, "LDX", Mode::Immediate),
    (0xe8, "INX", Mode::Implied),
    (0xca, "DEX", Mode::Implied),
    (0xc8, "INY", Mode::Implied),
    (0x4c, "JMP", Mode::Absolute),
    (0x20, "JSR", Mode::Absolute),
    (0x60, "RTS", Mode::Implied),
    (0xd0, "BNE", Mode::Relative),
];

fn decode(op: u8) -> Option<(&'static str, Mode)> {
    OPCODES
        .iter()
        .find(|(code, ..)| *code == op)
        .map(|(_, name, mode)| (*name, *mode))
}

/// Why the machine went back to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Checkpoint,
    /// Hit a 'BRK' or an unknown instruction.
    Break,
    Stepped,
    Returned,
    /// Ran for too long without stopping.
    Limit,
    /// A checkpoint command asked to quit.
    Quit,
}

#[derive(Default, Clone, Copy)]
struct Regs {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    fl: u8,
    pc: u16,
}

pub struct Machine {
    regs: Regs,
    ram: Vec<u8>,
    drive: Vec<u8>,
    cycles: u64,
    /// The address of the instruction being executed.
    ins_pc: u16,
    /// Set when a load or store hits a checkpoint which stops execution.
    stop: bool,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            regs: Regs { sp: 0xff, pc: 0xc000, ..Default::default() },
            ram: vec![0; 0x10000],
            drive: vec![0; DRIVE_RAM_SIZE],
            cycles: 0,
            ins_pc: 0xc000,
            stop: false,
        }
    }
}

impl Machine {
    /// Load the demo program at $c000. It calls a subroutine 256 times, which copies a byte
    /// from the table at $1000 to the border color register.
    pub fn with_demo() -> Self {
        let mut machine = Self::default();
        let code: &[u8] = &[
            0xa2, 0x00,       // c000  LDX #$00
            0x20, 0x10, 0xc0, // c002  JSR $c010
            0xe8,             // c005  INX
            0xd0, 0xfa,       // c006  BNE $c002
            0x00,             // c008  BRK
        ];
        machine.ram[0xc000..0xc000 + code.len()].copy_from_slice(code);
        let sub: &[u8] = &[
            0xbd, 0x00, 0x10, // c010  LDA $1000,X
            0x8d, 0x20, 0xd0, // c013  STA $d020
            0x60,             // c016  RTS
        ];
        machine.ram[0xc010..0xc010 + sub.len()].copy_from_slice(sub);
        machine
    }

    fn set_nz(&mut self, val: u8) {
        self.regs.fl &= !(FLAG_ZERO | FLAG_NEGATIVE);
        if val == 0 {
            self.regs.fl |= FLAG_ZERO;
        }
        self.regs.fl |= val & FLAG_NEGATIVE;
    }

    fn fetch(&mut self) -> u8 {
        let val = self.ram[self.regs.pc as usize];
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();
        u16::from_le_bytes([lo, hi])
    }

    fn load(&mut self, mon: &mut Monitor, loc: u16) -> u8 {
        let pc = self.ins_pc;
        if mon.check_checkpoint(self, MemSpace::Computer, loc, pc, Op::Load) {
            self.stop = true;
        }
        self.ram[loc as usize]
    }

    fn store(&mut self, mon: &mut Monitor, loc: u16, val: u8) {
        let pc = self.ins_pc;
        if mon.check_checkpoint(self, MemSpace::Computer, loc, pc, Op::Store) {
            self.stop = true;
        }
        self.ram[loc as usize] = val;
    }

    fn push(&mut self, val: u8) {
        self.ram[0x100 + self.regs.sp as usize] = val;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.ram[0x100 + self.regs.sp as usize]
    }

    /// Execute a single instruction. Returns false if the machine hit a 'BRK' or an unknown
    /// instruction, in which case the program counter is left at it.
    fn execute(&mut self, mon: &mut Monitor) -> bool {
        self.ins_pc = self.regs.pc;
        let op = self.fetch();
        let Some((_, mode)) = decode(op) else {
            warn!("unknown opcode ${op:02x} at ${:04x}", self.ins_pc);
            self.regs.pc = self.ins_pc;
            return false;
        };
        self.cycles += mode.len() as u64 + 1;
        match op {
            0x00 => {
                self.regs.pc = self.ins_pc;
                return false;
            }
            0xa9 => {
                self.regs.a = self.fetch();
                self.set_nz(self.regs.a);
            }
            0xad | 0xbd => {
                let mut loc = self.fetch_word();
                if op == 0xbd {
                    loc = loc.wrapping_add(self.regs.x as u16);
                }
                self.regs.a = self.load(mon, loc);
                self.set_nz(self.regs.a);
            }
            0x8d | 0x9d => {
                let mut loc = self.fetch_word();
                if op == 0x9d {
                    loc = loc.wrapping_add(self.regs.x as u16);
                }
                let a = self.regs.a;
                self.store(mon, loc, a);
            }
            0xa2 => {
                self.regs.x = self.fetch();
                self.set_nz(self.regs.x);
            }
            0xe8 => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.set_nz(self.regs.x);
            }
            0xca => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.set_nz(self.regs.x);
            }
            0xc8 => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.set_nz(self.regs.y);
            }
            0x4c => self.regs.pc = self.fetch_word(),
            0x20 => {
                let target = self.fetch_word();
                let [lo, hi] = self.regs.pc.wrapping_sub(1).to_le_bytes();
                self.push(hi);
                self.push(lo);
                self.regs.pc = target;
            }
            0x60 => {
                let lo = self.pull();
                let hi = self.pull();
                self.regs.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
            }
            0xd0 => {
                let offset = self.fetch() as i8;
                if self.regs.fl & FLAG_ZERO == 0 {
                    self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
                }
            }
            // NOP
            _ => (),
        }
        true
    }

    /// Run the machine as requested by the monitor.
    pub fn run(&mut self, mon: &mut Monitor, resume: Resume) -> StopReason {
        let reason = self.run_until_stop(mon, resume);
        // Nothing a checkpoint command asked for may leak to the next line typed at the prompt.
        match mon.take_resume() {
            Some(Resume::Quit) => StopReason::Quit,
            _ => reason,
        }
    }

    fn run_until_stop(&mut self, mon: &mut Monitor, resume: Resume) -> StopReason {
        let mut goal = Goal::new(resume, self.regs.sp);
        // The instruction the monitor was entered at doesn't trigger again.
        let mut entered = true;
        for _ in 0..RUN_LIMIT {
            if !std::mem::take(&mut entered) {
                let pc = self.regs.pc;
                if mon.check_checkpoint(self, MemSpace::Computer, pc, pc, Op::Exec) {
                    match carry_on(mon) {
                        Ok(resume) => {
                            goal = Goal::new(resume, self.regs.sp);
                            entered = true;
                            continue;
                        }
                        Err(reason) => return reason,
                    }
                }
            }
            if !self.execute(mon) {
                return StopReason::Break;
            }
            if std::mem::take(&mut self.stop) {
                match carry_on(mon) {
                    Ok(resume) => {
                        goal = Goal::new(resume, self.regs.sp);
                        continue;
                    }
                    Err(reason) => return reason,
                }
            }
            if let Some(reason) = goal.reached(self.regs.sp) {
                return reason;
            }
        }
        StopReason::Limit
    }
}

/// A checkpoint stopped the machine. The command attached to it may have asked to keep going.
fn carry_on(mon: &mut Monitor) -> Result<Resume, StopReason> {
    match mon.take_resume() {
        None => Err(StopReason::Checkpoint),
        Some(Resume::Quit) => Err(StopReason::Quit),
        Some(resume) => Ok(resume),
    }
}

/// Where a run should stop, besides checkpoints and 'BRK'.
struct Goal {
    left: Option<u32>,
    over: bool,
    until_return: bool,
    start_sp: u8,
}

impl Goal {
    fn new(resume: Resume, sp: u8) -> Self {
        let (left, over, until_return) = match resume {
            Resume::Step { count, over } => (Some(count), over, false),
            Resume::Return => (None, false, true),
            Resume::Continue | Resume::Quit => (None, false, false),
        };
        Self { left, over, until_return, start_sp: sp }
    }

    /// Called after each instruction with the stack pointer.
    fn reached(&mut self, sp: u8) -> Option<StopReason> {
        if self.until_return && sp > self.start_sp {
            return Some(StopReason::Returned);
        }
        if let Some(count) = &mut self.left {
            // Instructions inside subroutines don't count when stepping over them.
            if !self.over || sp >= self.start_sp {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    return Some(StopReason::Stepped);
                }
            }
        }
        None
    }
}

impl Host for Machine {
    fn register(&self, space: MemSpace, reg: Reg) -> Option<u16> {
        if space != MemSpace::Computer {
            return None;
        }
        let regs = &self.regs;
        Some(match reg {
            Reg::A => regs.a as u16,
            Reg::X => regs.x as u16,
            Reg::Y => regs.y as u16,
            Reg::SP => regs.sp as u16,
            Reg::FL => regs.fl as u16,
            Reg::PC => regs.pc,
            _ => return None,
        })
    }

    fn set_register(&mut self, space: MemSpace, reg: Reg, val: u16) -> Result<(), HostError> {
        if space != MemSpace::Computer {
            return Err(HostError::Unsupported);
        }
        let byte = val as u8;
        match reg {
            Reg::A => self.regs.a = byte,
            Reg::X => self.regs.x = byte,
            Reg::Y => self.regs.y = byte,
            Reg::SP => self.regs.sp = byte,
            Reg::FL => self.regs.fl = byte,
            Reg::PC => self.regs.pc = val,
            reg => return Err(HostError::InvalidRegister(reg)),
        }
        Ok(())
    }

    fn registers(&self, space: MemSpace) -> Vec<Reg> {
        match space {
            MemSpace::Computer => vec![Reg::PC, Reg::A, Reg::X, Reg::Y, Reg::SP, Reg::FL],
            _ => Vec::new(),
        }
    }

    fn read(&mut self, addr: Addr) -> u8 {
        self.peek(addr, None)
    }

    fn peek(&self, addr: Addr, _bank: Option<&str>) -> u8 {
        match addr.space {
            MemSpace::Computer => self.ram[addr.loc as usize],
            MemSpace::Disk8 => self.drive[addr.loc as usize % DRIVE_RAM_SIZE],
            _ => 0,
        }
    }

    fn write(&mut self, addr: Addr, val: u8) {
        match addr.space {
            MemSpace::Computer => self.ram[addr.loc as usize] = val,
            MemSpace::Disk8 => self.drive[addr.loc as usize % DRIVE_RAM_SIZE] = val,
            _ => (),
        }
    }

    fn disassemble(&self, addr: Addr, bank: Option<&str>) -> (String, u16) {
        let byte = |n: u16| self.peek(addr.offset(n), bank);
        let word = || u16::from_le_bytes([byte(1), byte(2)]);
        let op = byte(0);
        let Some((name, mode)) = decode(op) else {
            return (format!("???   ${op:02X}"), 1);
        };
        let text = match mode {
            Mode::Implied => name.to_string(),
            Mode::Immediate => format!("{name} #${:02X}", byte(1)),
            Mode::Absolute => format!("{name} ${:04X}", word()),
            Mode::AbsoluteX => format!("{name} ${:04X},X", word()),
            Mode::Relative => {
                let target = addr.loc.wrapping_add(2).wrapping_add(byte(1) as i8 as u16);
                format!("{name} ${target:04X}")
            }
        };
        (text, mode.len())
    }

    fn banks(&self, space: MemSpace) -> Vec<String> {
        match space {
            MemSpace::Computer => vec!["ram".to_string()],
            _ => Vec::new(),
        }
    }

    fn timing(&self, space: MemSpace) -> Option<Timing> {
        (space == MemSpace::Computer).then(|| Timing {
            line: ((self.cycles / CYCLES_PER_LINE) % LINES_PER_FRAME) as u32,
            cycle: (self.cycles % CYCLES_PER_LINE) as u32,
        })
    }

    fn cpu_models(&self, space: MemSpace) -> Vec<&'static str> {
        match space {
            MemSpace::Computer => vec!["6502"],
            _ => Vec::new(),
        }
    }

    fn cpu_model(&self, space: MemSpace) -> Option<&'static str> {
        (space == MemSpace::Computer).then(|| "6502")
    }

    fn stack_frames(&self, space: MemSpace) -> Vec<u16> {
        if space != MemSpace::Computer {
            return Vec::new();
        }
        let stack = &self.ram[0x100 + self.regs.sp as usize + 1..0x200];
        stack
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]).wrapping_add(1))
            .collect()
    }

    fn assemble(&mut self, addr: Addr, ins: &str) -> Result<u16, HostError> {
        let (bytes, len) = assemble(addr.loc, ins)?;
        for (i, byte) in bytes[..len as usize].iter().enumerate() {
            self.write(addr.offset(i as u16), *byte);
        }
        Ok(len)
    }

    fn disk_command(&mut self, space: MemSpace, cmd: &str) -> Result<String, HostError> {
        if space != MemSpace::Disk8 {
            return Err(HostError::Unsupported);
        }
        debug!("disk command '{cmd}'");
        match cmd.trim() {
            "" | "UI" => Ok("00, OK,00,00".to_string()),
            _ => Ok("31,SYNTAX ERROR,00,00".to_string()),
        }
    }
}

fn parse_hex(text: &str) -> Result<u16, HostError> {
    let digits = text.strip_prefix('$').unwrap_or(text);
    u16::from_str_radix(digits, 16)
        .map_err(|_| HostError::Failed(format!("invalid operand '{text}'")))
}

/// Assemble a single instruction at 'loc'.
fn assemble(loc: u16, ins: &str) -> Result<([u8; 3], u16), HostError> {
    let ins = ins.trim().to_ascii_uppercase();
    let (name, operand) = match ins.split_once(char::is_whitespace) {
        Some((name, operand)) => (name, operand.trim()),
        None => (ins.as_str(), ""),
    };
    let (mode, val) = if operand.is_empty() {
        (Mode::Implied, 0)
    } else if let Some(imm) = operand.strip_prefix('#') {
        (Mode::Immediate, parse_hex(imm)?)
    } else if let Some(abs) = operand.strip_suffix(",X") {
        (Mode::AbsoluteX, parse_hex(abs.trim())?)
    } else {
        (Mode::Absolute, parse_hex(operand)?)
    };
    let found = OPCODES.iter().find(|(_, other, other_mode)| {
        *other == name
            && (*other_mode == mode || (mode == Mode::Absolute && *other_mode == Mode::Relative))
    });
    let Some((op, _, mode)) = found else {
        return Err(HostError::Failed(format!("unknown instruction '{ins}'")));
    };
    let [lo, hi] = val.to_le_bytes();
    let bytes = match mode {
        Mode::Implied => [*op, 0, 0],
        Mode::Immediate => {
            if val > 0xff {
                return Err(HostError::Failed(format!("immediate '{operand}' too large")));
            }
            [*op, lo, 0]
        }
        Mode::Absolute | Mode::AbsoluteX => [*op, lo, hi],
        Mode::Relative => {
            let offset = val.wrapping_sub(loc.wrapping_add(2)) as i16;
            let offset = i8::try_from(offset)
                .map_err(|_| HostError::Failed(format!("branch to '{operand}' out of range")))?;
            [*op, offset as u8, 0]
        }
    };
    Ok((bytes, mode.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use vmon_core::Settings;

    fn setup(code: &[u8]) -> (Machine, Monitor) {
        let mut machine = Machine::default();
        machine.ram[0xc000..0xc000 + code.len()].copy_from_slice(code);
        let mon = Monitor::new(Box::new(std::io::sink()), Settings::default());
        (machine, mon)
    }

    #[test]
    fn breakpoint_stops_before_instruction() {
        let (mut machine, mut mon) = setup(&[0xea, 0xea, 0xe8, 0x00]);
        mon.execute_line(&mut machine, "break c002");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Checkpoint);
        assert_eq!(machine.regs.pc, 0xc002);
        assert_eq!(machine.regs.x, 0);
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Break);
        assert_eq!(machine.regs.x, 1);
    }

    #[test]
    fn watchpoint_on_store() {
        let (mut machine, mut mon) = setup(&[0xa9, 0x07, 0x8d, 0x20, 0xd0, 0xea, 0x00]);
        mon.execute_line(&mut machine, "watch store d020");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Checkpoint);
        assert_eq!(machine.ram[0xd020], 7);
        assert_eq!(machine.regs.pc, 0xc005);
    }

    #[test]
    fn step_over_subroutine() {
        let (mut machine, mut mon) = setup(&[0x20, 0x10, 0xc0, 0xea, 0x00]);
        machine.ram[0xc010..0xc013].copy_from_slice(&[0xe8, 0xe8, 0x60]);

        assert_eq!(
            machine.run(&mut mon, Resume::Step { count: 1, over: true }),
            StopReason::Stepped,
        );
        assert_eq!(machine.regs.pc, 0xc003);
        assert_eq!(machine.regs.x, 2);

        machine.regs.pc = 0xc000;
        assert_eq!(
            machine.run(&mut mon, Resume::Step { count: 2, over: false }),
            StopReason::Stepped,
        );
        assert_eq!(machine.regs.pc, 0xc011);
        assert_eq!(machine.stack_frames(MemSpace::Computer), [0xc003]);
        assert_eq!(machine.run(&mut mon, Resume::Return), StopReason::Returned);
        assert_eq!(machine.regs.pc, 0xc003);
    }

    #[test]
    fn until_runs_to_address() {
        let mut machine = Machine::with_demo();
        let mut mon = Monitor::new(Box::new(std::io::sink()), Settings::default());
        mon.execute_line(&mut machine, "until c013");
        let resume = mon.take_resume().unwrap();
        assert_eq!(machine.run(&mut mon, resume), StopReason::Checkpoint);
        assert_eq!(machine.regs.pc, 0xc013);
        assert!(mon.checkpoints.is_empty());
    }

    #[test]
    fn checkpoint_command_keeps_running() {
        let mut machine = Machine::with_demo();
        let mut mon = Monitor::new(Box::new(std::io::sink()), Settings::default());
        mon.execute_line(&mut machine, "break c002; command 1 \"x\"");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Break);
        assert_eq!(mon.checkpoints.get(1).map(|cp| cp.hit_count), Some(256));
        mon.execute_line(&mut machine, "m 1000 1001");
        assert_eq!(mon.take_resume(), None);
    }

    #[test]
    fn checkpoint_command_sets_new_stop() {
        let mut machine = Machine::with_demo();
        let mut mon = Monitor::new(Box::new(std::io::sink()), Settings::default());
        mon.execute_line(&mut machine, "break c005; command 1 \"until c013\"");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Checkpoint);
        assert_eq!(machine.regs.pc, 0xc013);
        assert_eq!(machine.regs.x, 1);
        assert_eq!(mon.take_resume(), None);
    }

    #[test]
    fn trace_command_request_is_dropped() {
        let mut machine = Machine::with_demo();
        let mut mon = Monitor::new(Box::new(std::io::sink()), Settings::default());
        mon.execute_line(&mut machine, "trace exec c008; command 1 \"x\"");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Break);
        assert_eq!(mon.take_resume(), None);
    }

    #[test]
    fn checkpoint_command_quits() {
        let (mut machine, mut mon) = setup(&[0xea, 0xea, 0x00]);
        mon.execute_line(&mut machine, "break c001; command 1 \"quit\"");
        assert_eq!(machine.run(&mut mon, Resume::Continue), StopReason::Quit);
        assert_eq!(mon.take_resume(), None);
    }

    #[test]
    fn assemble_and_disassemble() {
        let mut machine = Machine::default();
        let at = Addr::new(MemSpace::Computer, 0xc000);
        assert_eq!(machine.assemble(at, "lda $1000,x"), Ok(3));
        assert_eq!(machine.disassemble(at, None), ("LDA $1000,X".to_string(), 3));
        assert_eq!(machine.assemble(at, "bne $bff0"), Ok(2));
        assert_eq!(machine.disassemble(at, None), ("BNE $BFF0".to_string(), 2));
        assert!(machine.assemble(at, "lda #$100").is_err());
        assert!(machine.assemble(at, "frob").is_err());
    }
}
