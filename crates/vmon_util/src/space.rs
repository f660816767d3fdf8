use serde::{Deserialize, Serialize};

use std::fmt;

/// One of the independent 16-bit address spaces the monitor can look at. The computer itself
/// and each of the attached disk drives have their own processor and memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemSpace {
    #[serde(rename = "c")]
    Computer,
    #[serde(rename = "8")]
    Disk8,
    #[serde(rename = "9")]
    Disk9,
    #[serde(rename = "10")]
    Disk10,
    #[serde(rename = "11")]
    Disk11,
}

impl MemSpace {
    pub const COUNT: usize = 5;

    pub const ALL: [MemSpace; Self::COUNT] = [
        MemSpace::Computer,
        MemSpace::Disk8,
        MemSpace::Disk9,
        MemSpace::Disk10,
        MemSpace::Disk11,
    ];

    /// The prefix used when writing an address, fx. 'C' in 'C:$1000'.
    pub fn name(self) -> &'static str {
        match self {
            MemSpace::Computer => "C",
            MemSpace::Disk8 => "8",
            MemSpace::Disk9 => "9",
            MemSpace::Disk10 => "10",
            MemSpace::Disk11 => "11",
        }
    }

    /// Index used for per-space tables. Also the memspace byte of the binary protocol.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Parse the name of a memspace, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|space| space.name().eq_ignore_ascii_case(name))
            .copied()
    }
}

impl Default for MemSpace {
    fn default() -> Self {
        MemSpace::Computer
    }
}

impl fmt::Display for MemSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A location inside a memspace. "No address" is represented by 'Option<Addr>'.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Addr {
    pub space: MemSpace,
    pub loc: u16,
}

impl Addr {
    pub fn new(space: MemSpace, loc: u16) -> Self {
        Self { space, loc }
    }

    /// The address 'n' bytes ahead, wrapping around at the end of the space.
    #[must_use]
    pub fn offset(self, n: u16) -> Self {
        Self { space: self.space, loc: self.loc.wrapping_add(n) }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:${:04x}", self.space, self.loc)
    }
}

#[test]
fn space_names() {
    assert_eq!(MemSpace::from_name("c"), Some(MemSpace::Computer));
    assert_eq!(MemSpace::from_name("10"), Some(MemSpace::Disk10));
    assert_eq!(MemSpace::from_name("12"), None);
    for space in MemSpace::ALL {
        assert_eq!(MemSpace::from_index(space.index()), Some(space));
    }
}

#[test]
fn addr_display() {
    let addr = Addr::new(MemSpace::Disk8, 0x1c00);
    assert_eq!(addr.to_string(), "8:$1c00");
    assert_eq!(Addr::new(MemSpace::Computer, 0xffff).offset(2).loc, 1);
}
