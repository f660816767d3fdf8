use serde::Serialize;

use std::fmt;

/// A register name understood by the monitor. Which of them a memspace actually has depends on
/// the processor model active for it. The 6502 family uses 'A' to 'FL', the z80 uses the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Reg(pub u8);

pub const REGISTER_NAMES: [&str; 18] = [
    "A", "X", "Y", "PC", "SP", "FL", "AF", "BC", "DE", "HL", "IX", "IY", "I", "R", "AF'", "BC'",
    "DE'", "HL'",
];

impl Reg {
    pub const A: Reg = Reg(0);
    pub const X: Reg = Reg(1);
    pub const Y: Reg = Reg(2);
    pub const PC: Reg = Reg(3);
    pub const SP: Reg = Reg(4);
    pub const FL: Reg = Reg(5);
    pub const AF: Reg = Reg(6);
    pub const BC: Reg = Reg(7);
    pub const DE: Reg = Reg(8);
    pub const HL: Reg = Reg(9);
    pub const IX: Reg = Reg(10);
    pub const IY: Reg = Reg(11);
    pub const I: Reg = Reg(12);
    pub const R: Reg = Reg(13);
    pub const AF2: Reg = Reg(14);
    pub const BC2: Reg = Reg(15);
    pub const DE2: Reg = Reg(16);
    pub const HL2: Reg = Reg(17);

    /// Look up a register by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTER_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|idx| Reg(idx as u8))
    }

    pub fn name(self) -> &'static str {
        REGISTER_NAMES[self.0 as usize]
    }

    /// The width of the register in bits.
    pub fn bits(self) -> u32 {
        match self {
            Reg::A | Reg::X | Reg::Y | Reg::SP | Reg::FL | Reg::I | Reg::R => 8,
            _ => 16,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn names() {
    assert_eq!(Reg::from_name("pc"), Some(Reg::PC));
    assert_eq!(Reg::from_name("hl'"), Some(Reg::HL2));
    assert_eq!(Reg::from_name("q"), None);
    assert_eq!(Reg::AF2.name(), "AF'");
    assert_eq!(Reg::PC.bits(), 16);
}
