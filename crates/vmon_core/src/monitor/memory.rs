use super::{mon_out, Monitor};
use crate::host::Host;

use vmon_cmd::{AddrArg, Data, Error, Range};
use vmon_util::{Addr, Radix};

/// Bytes shown by 'mem' when no end address is given.
const MEM_DEFAULT_LEN: u32 = 0x80;

/// Instructions shown by 'disass' when no end address is given.
const DISASS_DEFAULT_COUNT: usize = 16;

impl Monitor {
    /// Read memory for display. Only has side effects if enabled with 'sidefx'.
    pub(super) fn read_byte(&self, host: &mut dyn Host, addr: Addr) -> u8 {
        if self.sidefx {
            host.read(addr)
        } else {
            host.peek(addr, self.bank(addr.space))
        }
    }

    /// The addresses from 'start' to 'end', or 'len' bytes from 'start' without going past the
    /// end of the memspace.
    fn span(start: Addr, end: Option<Addr>, len: u32) -> impl Iterator<Item = Addr> {
        let last = match end {
            Some(end) => end.loc as u32,
            None => (start.loc as u32 + len - 1).min(0xffff),
        };
        (start.loc as u32..=last).map(move |loc| Addr::new(start.space, loc as u16))
    }

    fn format_byte(&self, val: u8) -> String {
        match self.radix {
            Radix::Hex => format!("{val:02x}"),
            Radix::Dec => format!("{val:3}"),
            Radix::Oct => format!("{val:03o}"),
            Radix::Bin => format!("{val:08b}"),
        }
    }

    pub(super) fn memory(
        &mut self,
        host: &mut dyn Host,
        range: Option<Range>,
        text_only: bool,
    ) -> Result<(), Error> {
        let (start, end) = match range {
            Some(range) => self.range(host, &range)?,
            None => (Addr::new(self.device, self.mem_dot[self.device.index()]), None),
        };
        let per_row = match (text_only, self.radix) {
            (true, _) => 32,
            (false, Radix::Bin) => 8,
            (false, _) => 16,
        };
        let addrs: Vec<Addr> = Self::span(start, end, MEM_DEFAULT_LEN).collect();
        for row in addrs.chunks(per_row) {
            let bytes: Vec<u8> = row.iter().map(|addr| self.read_byte(host, *addr)).collect();
            let text: String = bytes
                .iter()
                .map(|b| if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' })
                .collect();
            let at = format!(">{}:{:04x}", row[0].space, row[0].loc);
            let line = if text_only {
                format!("{at}  {text}")
            } else {
                let hex: Vec<String> = bytes.iter().map(|b| self.format_byte(*b)).collect();
                format!("{at}  {}   {text}", hex.join(" "))
            };
            mon_out!(self, "{line}");
        }
        if let Some(last) = addrs.last() {
            self.mem_dot[start.space.index()] = last.loc.wrapping_add(1);
        }
        Ok(())
    }

    pub(super) fn fill(
        &mut self,
        host: &mut dyn Host,
        range: Range,
        data: Vec<Data>,
    ) -> Result<(), Error> {
        let (start, end) = self.range(host, &range)?;
        let bytes = self.bytes(host, &data, start.space)?;
        for (addr, byte) in Self::span(start, end, 1).zip(bytes.iter().cycle()) {
            host.write(addr, *byte);
        }
        Ok(())
    }

    pub(super) fn move_memory(
        &mut self,
        host: &mut dyn Host,
        range: Range,
        dest: AddrArg,
    ) -> Result<(), Error> {
        let (start, end) = self.range(host, &range)?;
        let dest = self.addr_in(host, &dest, start.space)?;
        // Read everything first, so overlapping ranges are copied correctly.
        let bytes: Vec<u8> = Self::span(start, end, 1)
            .map(|addr| self.read_byte(host, addr))
            .collect();
        for (i, byte) in bytes.into_iter().enumerate() {
            host.write(dest.offset(i as u16), byte);
        }
        Ok(())
    }

    pub(super) fn compare(
        &mut self,
        host: &mut dyn Host,
        range: Range,
        dest: AddrArg,
    ) -> Result<(), Error> {
        let (start, end) = self.range(host, &range)?;
        let dest = self.addr_in(host, &dest, start.space)?;
        for (i, addr) in Self::span(start, end, 1).enumerate() {
            let other = dest.offset(i as u16);
            let (a, b) = (self.read_byte(host, addr), self.read_byte(host, other));
            if a != b {
                mon_out!(self, "${:04x} ${:04x}: {a:02x} {b:02x}", addr.loc, other.loc);
            }
        }
        Ok(())
    }

    pub(super) fn hunt(
        &mut self,
        host: &mut dyn Host,
        range: Range,
        data: Vec<Data>,
    ) -> Result<(), Error> {
        let (start, end) = self.range(host, &range)?;
        let pattern = self.bytes(host, &data, start.space)?;
        if pattern.is_empty() {
            return Ok(());
        }
        let mem: Vec<u8> = Self::span(start, end, 1)
            .map(|addr| self.read_byte(host, addr))
            .collect();
        let found: Vec<u16> = mem
            .windows(pattern.len())
            .enumerate()
            .filter(|(_, window)| *window == pattern.as_slice())
            .map(|(i, _)| start.loc.wrapping_add(i as u16))
            .collect();
        for loc in found {
            mon_out!(self, "{}", Addr::new(start.space, loc));
        }
        Ok(())
    }

    pub(super) fn write_data(
        &mut self,
        host: &mut dyn Host,
        addr: AddrArg,
        data: Vec<Data>,
    ) -> Result<(), Error> {
        let addr = self.addr(host, &addr)?;
        let bytes = self.bytes(host, &data, addr.space)?;
        for (i, byte) in bytes.into_iter().enumerate() {
            host.write(addr.offset(i as u16), byte);
        }
        Ok(())
    }

    /// Disassemble one instruction. Returns the line and the length of the instruction.
    pub(crate) fn disassembly_line(
        &self,
        host: &dyn Host,
        addr: Addr,
        bank: Option<&str>,
    ) -> (String, u16) {
        let (text, len) = host.disassemble(addr, bank);
        let len = len.max(1);
        let bytes: Vec<String> = (0..len)
            .map(|i| format!("{:02x}", host.peek(addr.offset(i), bank)))
            .collect();
        let mut line = String::new();
        if let Some(name) = self.symbols.name_of(addr.space, addr.loc) {
            line.push_str(&format!(".{name}:\n"));
        }
        line.push_str(&format!(
            ".{}:{:04x}  {:<9}  {text}",
            addr.space,
            addr.loc,
            bytes.join(" "),
        ));
        (line, len)
    }

    pub(super) fn disassemble(
        &mut self,
        host: &dyn Host,
        range: Option<Range>,
    ) -> Result<(), Error> {
        let (start, end) = match range {
            Some(range) => self.range(host, &range)?,
            None => (Addr::new(self.device, self.disass_dot[self.device.index()]), None),
        };
        let bank = self.bank(start.space).map(str::to_string);
        let mut addr = start;
        let mut count = 0;
        loop {
            let (line, len) = self.disassembly_line(host, addr, bank.as_deref());
            mon_out!(self, "{line}");
            count += 1;
            let next = addr.loc as u32 + len as u32;
            addr = addr.offset(len);
            let done = match end {
                Some(end) => next > end.loc as u32,
                None => count >= DISASS_DEFAULT_COUNT,
            };
            if done || next > 0xffff {
                break;
            }
        }
        self.disass_dot[start.space.index()] = addr.loc;
        Ok(())
    }

    pub(super) fn assemble(
        &mut self,
        host: &mut dyn Host,
        addr: AddrArg,
        ins: Option<&str>,
    ) -> Result<(), Error> {
        let addr = self.addr(host, &addr)?;
        let Some(ins) = ins else {
            self.disass_dot[addr.space.index()] = addr.loc;
            return Ok(());
        };
        match host.assemble(addr, ins) {
            Ok(len) => {
                let next = addr.offset(len);
                self.disass_dot[addr.space.index()] = next.loc;
                mon_out!(self, ".{}:{:04x}", next.space, next.loc);
            }
            Err(err) => mon_out!(self, "Can't assemble '{ins}': {err}"),
        }
        Ok(())
    }
}
