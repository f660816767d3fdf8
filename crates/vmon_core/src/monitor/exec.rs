use super::{mon_out, Monitor, Resume};
use crate::host::Host;

use vmon_cmd::{AddrArg, Error, ErrorCode, Expr};
use vmon_util::{Addr, MemSpace, Reg};

impl Monitor {
    pub(super) fn step(
        &mut self,
        host: &dyn Host,
        count: Option<Expr>,
        over: bool,
    ) -> Result<(), Error> {
        let count = match count {
            Some(expr) => self.eval(host, &expr, self.device)?,
            None => 1,
        };
        let count = u32::try_from(count.max(1))
            .map_err(|_| Error::new(ErrorCode::ImmediateTooLarge, 0))?;
        self.resume = Some(Resume::Step { count, over });
        Ok(())
    }

    pub(super) fn goto(&mut self, host: &mut dyn Host, addr: Option<AddrArg>) -> Result<(), Error> {
        if let Some(addr) = addr {
            let addr = self.addr(host, &addr)?;
            if let Err(err) = host.set_register(addr.space, Reg::PC, addr.loc) {
                mon_out!(self, "Can't set PC: {err}");
                return Ok(());
            }
        }
        self.resume = Some(Resume::Continue);
        Ok(())
    }

    pub(super) fn backtrace(&mut self, host: &dyn Host) {
        let frames = host.stack_frames(self.device);
        if frames.is_empty() {
            mon_out!(self, "No return addresses on the stack");
        }
        for (depth, loc) in frames.into_iter().enumerate() {
            let label = self.symbols
                .name_of(self.device, loc)
                .map(|name| format!(" .{name}"))
                .unwrap_or_default();
            mon_out!(self, "({depth}) {}{label}", Addr::new(self.device, loc));
        }
    }

    /// The registers of 'space' as a header line and a value line.
    pub(crate) fn register_dump(&self, host: &dyn Host, space: MemSpace) -> String {
        let (mut names, mut vals) = (String::from("  "), String::from(".;"));
        for reg in host.registers(space) {
            let width = if reg.bits() > 8 { 4 } else { 2 };
            let val = match host.register(space, reg) {
                Some(val) => format!("{val:0width$x}"),
                None => "-".repeat(width),
            };
            if !vals.ends_with(';') {
                names.push(' ');
                vals.push(' ');
            }
            names.push_str(&format!("{:<width$}", reg.name()));
            vals.push_str(&val);
        }
        format!("{}\n{}", names.trim_end(), vals)
    }

    /// Print the instruction at 'addr' followed by the registers.
    pub(crate) fn disassemble_with_regdump(&mut self, host: &dyn Host, addr: Addr) {
        let line = self.disassembly_line(host, addr, None).0;
        let regs = self.register_dump(host, addr.space);
        mon_out!(self, "{line}");
        mon_out!(self, "{regs}");
    }

    /// Show the instruction the processor of the default memspace is at, followed by the
    /// registers. Used when the monitor is entered.
    pub fn show_position(&mut self, host: &dyn Host) {
        let space = self.device;
        if let Some(pc) = host.register(space, Reg::PC) {
            self.disassemble_with_regdump(host, Addr::new(space, pc));
        }
    }

    pub(super) fn registers(
        &mut self,
        host: &mut dyn Host,
        space: Option<MemSpace>,
        assign: Vec<(Reg, Expr)>,
    ) -> Result<(), Error> {
        let space = space.unwrap_or(self.device);
        if assign.is_empty() {
            let regs = self.register_dump(host, space);
            mon_out!(self, "{regs}");
            return Ok(());
        }
        for (reg, expr) in assign {
            let val = self.eval(host, &expr, space)?;
            let val = u16::try_from(val)
                .ok()
                .filter(|val| reg.bits() > 8 || *val <= 0xff)
                .ok_or(Error::new(ErrorCode::ImmediateTooLarge, 0))?;
            if let Err(err) = host.set_register(space, reg, val) {
                mon_out!(self, "Can't set {reg}: {err}");
            }
        }
        Ok(())
    }

    pub(super) fn cpu(&mut self, host: &mut dyn Host, model: Option<&str>) {
        let space = self.device;
        match model {
            Some(model) => match host.set_cpu_model(space, model) {
                Ok(()) => info!("{space} now uses the {model} processor"),
                Err(err) => mon_out!(self, "Unknown CPU type '{model}': {err}"),
            },
            None => {
                let active = host.cpu_model(space).unwrap_or("unknown");
                let models = host.cpu_models(space).join(" ");
                mon_out!(self, "Current CPU: {active}");
                if !models.is_empty() {
                    mon_out!(self, "Available: {models}");
                }
            }
        }
    }

    pub(super) fn select_bank(&mut self, host: &dyn Host, name: Option<&str>) {
        let space = self.device;
        let banks = host.banks(space);
        match name {
            Some(name) => match banks.into_iter().find(|bank| bank.eq_ignore_ascii_case(name)) {
                Some(bank) => self.banks[space.index()] = Some(bank),
                None => mon_out!(self, "Unknown bank name '{name}'"),
            },
            None if banks.is_empty() => mon_out!(self, "Banks not available in {space}"),
            None => {
                mon_out!(self, "Available banks:");
                let list = banks.join(" ");
                mon_out!(self, "{list}");
            }
        }
    }
}
