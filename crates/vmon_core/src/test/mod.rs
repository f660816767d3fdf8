mod checkpoint;
mod commands;
mod cond;

use crate::event::{CheckpointInfo, CheckpointObserver};
use crate::host::{Host, HostError, Timing};
use crate::monitor::{Monitor, Settings};

use vmon_util::{Addr, MemSpace, Reg};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Monitor output shared with the test.
#[derive(Clone, Default)]
pub struct Output(Rc<RefCell<Vec<u8>>>);

impl Output {
    /// Take everything written since last time.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8(bytes).unwrap()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every checkpoint hit it's notified of.
#[derive(Clone, Default)]
pub struct Hits(Rc<RefCell<Vec<CheckpointInfo>>>);

impl Hits {
    pub fn ids(&self) -> Vec<u32> {
        self.0.borrow().iter().map(|info| info.id).collect()
    }
}

impl CheckpointObserver for Hits {
    fn checkpoint_hit(&mut self, info: &CheckpointInfo) {
        self.0.borrow_mut().push(info.clone());
    }
}

/// A machine with 64K of memory in each memspace and a 6502 style register file. The computer
/// has a second processor model, "z80", with it's own program counter.
pub struct FakeHost {
    pub mem: BTreeMap<MemSpace, Vec<u8>>,
    pub regs: BTreeMap<(MemSpace, Reg), u16>,
    pub reads: usize,
    pub timing: Option<Timing>,
    pub model: &'static str,
    pub z80_pc: u16,
}

impl Default for FakeHost {
    fn default() -> Self {
        let mut regs = BTreeMap::new();
        for space in MemSpace::ALL {
            for reg in [Reg::A, Reg::X, Reg::Y, Reg::SP, Reg::FL] {
                regs.insert((space, reg), 0);
            }
            regs.insert((space, Reg::PC), 0xc000);
        }
        Self {
            mem: MemSpace::ALL.into_iter().map(|space| (space, vec![0; 0x10000])).collect(),
            regs,
            reads: 0,
            timing: None,
            model: "6502",
            z80_pc: 0,
        }
    }
}

impl FakeHost {
    pub fn set(&mut self, reg: Reg, val: u16) {
        self.regs.insert((MemSpace::Computer, reg), val);
    }

    pub fn byte(&self, loc: u16) -> u8 {
        self.mem[&MemSpace::Computer][loc as usize]
    }
}

impl Host for FakeHost {
    fn register(&self, space: MemSpace, reg: Reg) -> Option<u16> {
        if space == MemSpace::Computer && reg == Reg::PC && self.model == "z80" {
            return Some(self.z80_pc);
        }
        self.regs.get(&(space, reg)).copied()
    }

    fn set_register(&mut self, space: MemSpace, reg: Reg, val: u16) -> Result<(), HostError> {
        match self.regs.get_mut(&(space, reg)) {
            Some(slot) => {
                *slot = val;
                Ok(())
            }
            None => Err(HostError::InvalidRegister(reg)),
        }
    }

    fn registers(&self, _: MemSpace) -> Vec<Reg> {
        vec![Reg::PC, Reg::A, Reg::X, Reg::Y, Reg::SP, Reg::FL]
    }

    fn read(&mut self, addr: Addr) -> u8 {
        self.reads += 1;
        self.peek(addr, None)
    }

    fn peek(&self, addr: Addr, _: Option<&str>) -> u8 {
        self.mem[&addr.space][addr.loc as usize]
    }

    fn write(&mut self, addr: Addr, val: u8) {
        if let Some(mem) = self.mem.get_mut(&addr.space) {
            mem[addr.loc as usize] = val;
        }
    }

    fn disassemble(&self, addr: Addr, _: Option<&str>) -> (String, u16) {
        let arg = |n: u16| self.peek(addr.offset(n), None);
        match self.peek(addr, None) {
            0xea => ("NOP".to_string(), 1),
            0xad => (format!("LDA ${:02X}{:02X}", arg(2), arg(1)), 3),
            0x8d => (format!("STA ${:02X}{:02X}", arg(2), arg(1)), 3),
            op => (format!(".BYTE ${op:02X}"), 1),
        }
    }

    fn timing(&self, _: MemSpace) -> Option<Timing> {
        self.timing
    }

    fn cpu_models(&self, space: MemSpace) -> Vec<&'static str> {
        match space {
            MemSpace::Computer => vec!["6502", "z80"],
            _ => vec!["6502"],
        }
    }

    fn cpu_model(&self, space: MemSpace) -> Option<&'static str> {
        match space {
            MemSpace::Computer => Some(self.model),
            _ => Some("6502"),
        }
    }

    fn model_pc(&self, space: MemSpace, model: &str) -> Option<u16> {
        match (space, model) {
            (MemSpace::Computer, "z80") => Some(self.z80_pc),
            (_, "6502") => self.regs.get(&(space, Reg::PC)).copied(),
            _ => None,
        }
    }

    fn set_cpu_model(&mut self, space: MemSpace, model: &str) -> Result<(), HostError> {
        match (space, model) {
            (MemSpace::Computer, "z80") => self.model = "z80",
            (MemSpace::Computer, "6502") => self.model = "6502",
            _ => return Err(HostError::Unsupported),
        }
        Ok(())
    }
}

pub fn monitor() -> (Monitor, Output) {
    let out = Output::default();
    let mon = Monitor::new(Box::new(out.clone()), Settings::default());
    (mon, out)
}

/// Execute a line and return the output.
pub fn run(mon: &mut Monitor, host: &mut FakeHost, out: &Output, line: &str) -> String {
    out.take();
    mon.execute_line(host, line);
    out.take()
}
