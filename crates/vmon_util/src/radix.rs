use serde::{Deserialize, Serialize};

use std::fmt;

/// The default radix used to read bare numbers and to print values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Radix {
    Hex,
    Dec,
    Oct,
    Bin,
}

impl Default for Radix {
    fn default() -> Self {
        Radix::Hex
    }
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Hex => 16,
            Radix::Dec => 10,
            Radix::Oct => 8,
            Radix::Bin => 2,
        }
    }

    /// Parse a radix name. Accepts the first letter or the full name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "h" | "hex" | "hexadecimal" => Some(Radix::Hex),
            "d" | "dec" | "decimal" => Some(Radix::Dec),
            "o" | "oct" | "octal" => Some(Radix::Oct),
            "b" | "bin" | "binary" => Some(Radix::Bin),
            _ => None,
        }
    }

    /// Parse 'digits' in this radix. Returns 'None' if any digit is invalid or the value
    /// doesn't fit.
    pub fn parse(self, digits: &str) -> Option<i64> {
        i64::from_str_radix(digits, self.base()).ok()
    }

    /// Format 'val' without prefix, zero padded to 'bits' worth of digits.
    pub fn format(self, val: u64, bits: u32) -> String {
        match self {
            Radix::Hex => format!("{:0w$x}", val, w = ((bits + 3) / 4) as usize),
            Radix::Dec => format!("{val}"),
            Radix::Oct => format!("{:0w$o}", val, w = ((bits + 2) / 3) as usize),
            Radix::Bin => format!("{:0w$b}", val, w = bits as usize),
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Radix::Hex => "Hexadecimal",
            Radix::Dec => "Decimal",
            Radix::Oct => "Octal",
            Radix::Bin => "Binary",
        })
    }
}

#[test]
fn parse_digits() {
    assert_eq!(Radix::Hex.parse("c000"), Some(0xc000));
    assert_eq!(Radix::Dec.parse("c000"), None);
    assert_eq!(Radix::Oct.parse("17"), Some(15));
    assert_eq!(Radix::Bin.parse("1012"), None);
}

#[test]
fn format_padding() {
    assert_eq!(Radix::Hex.format(0x1f, 16), "001f");
    assert_eq!(Radix::Bin.format(5, 8), "00000101");
    assert_eq!(Radix::Oct.format(8, 8), "010");
    assert_eq!(Radix::Hex.format(0x1_0000_0000, 64), "0000000100000000");
    assert_eq!(Radix::from_name("D"), Some(Radix::Dec));
}
