//! The interactive monitor. Holds the state shared by all commands and executes command lines
//! against a ['Host'].

mod eval;
mod exec;
mod file;
mod memory;
mod points;
mod trap;

use crate::checkpoint::Checkpoints;
use crate::event::CheckpointObserver;
use crate::host::Host;
use crate::symbol::Symbols;

use vmon_cmd::{Command, Error, Parser};
use vmon_util::{MemSpace, Radix};

use std::fs::File;
use std::io::Write;

/// Write a line to the monitor output.
macro_rules! mon_out {
    ($mon:expr, $($arg:tt)*) => {
        $mon.print_line(&format!($($arg)*))
    };
}

pub(crate) use mon_out;

/// What the machine should do once the monitor is left. Set by the execution commands and
/// taken by the caller after each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Run 'count' instructions and enter the monitor again. If 'over' is set, subroutine
    /// calls count as a single instruction.
    Step { count: u32, over: bool },
    /// Run until the current subroutine returns.
    Return,
    /// Run until a checkpoint stops execution.
    Continue,
    Quit,
}

/// Settings the monitor starts with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub radix: Radix,
    pub device: MemSpace,
    pub sidefx: bool,
    /// How deep checkpoint commands and playback files may nest.
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radix: Radix::Hex,
            device: MemSpace::Computer,
            sidefx: false,
            max_depth: 16,
        }
    }
}

pub struct Monitor {
    pub checkpoints: Checkpoints,
    pub symbols: Symbols,
    /// Radix of numbers without prefix.
    pub radix: Radix,
    /// Memspace used when an address has no memspace prefix.
    pub device: MemSpace,
    /// If memory reads of the monitor may have side effects.
    pub sidefx: bool,
    max_depth: usize,
    /// Current nesting of command lines.
    depth: usize,
    /// The bank selected for listings of each memspace.
    banks: [Option<String>; MemSpace::COUNT],
    /// Where listings without a start address continue from.
    mem_dot: [u16; MemSpace::COUNT],
    disass_dot: [u16; MemSpace::COUNT],
    out: Box<dyn Write>,
    observer: Box<dyn CheckpointObserver>,
    record: Option<File>,
    resume: Option<Resume>,
}

impl Monitor {
    pub fn new(out: Box<dyn Write>, settings: Settings) -> Self {
        Self {
            checkpoints: Checkpoints::default(),
            symbols: Symbols::default(),
            radix: settings.radix,
            device: settings.device,
            sidefx: settings.sidefx,
            max_depth: settings.max_depth,
            depth: 0,
            banks: Default::default(),
            mem_dot: [0; MemSpace::COUNT],
            disass_dot: [0; MemSpace::COUNT],
            out,
            observer: Box::new(()),
            record: None,
            resume: None,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn CheckpointObserver>) {
        self.observer = observer;
    }

    /// Take the request to leave the monitor, if any command made one.
    pub fn take_resume(&mut self) -> Option<Resume> {
        self.resume.take()
    }

    /// The prompt shown before reading a line, fx. '(C:$c000) '.
    pub fn prompt(&self, host: &dyn Host) -> String {
        match host.register(self.device, vmon_util::Reg::PC) {
            Some(pc) => format!("({}:${pc:04x}) ", self.device),
            None => format!("({}) ", self.device),
        }
    }

    pub(crate) fn print_line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            warn!("failed to write monitor output: {err}");
        }
    }

    fn bank(&self, space: MemSpace) -> Option<&str> {
        self.banks[space.index()].as_deref()
    }

    fn report(&mut self, line: &str, err: Error) {
        debug!("error in line '{line}': {err}");
        mon_out!(self, "{}", err.report(line));
    }

    /// Parse and execute a line. Commands are executed one at a time, and the rest of the line
    /// is dropped after the first error. Returns 'false' if there was an error.
    pub fn execute_line(&mut self, host: &mut dyn Host, line: &str) -> bool {
        if self.depth >= self.max_depth {
            warn!("command nesting deeper than {}, dropping '{line}'", self.max_depth);
            mon_out!(self, "Commands nested too deep, not executing: {line}");
            return false;
        }
        if self.depth == 0 {
            self.record_line(line);
        }
        self.depth += 1;
        let res = self.execute_commands(host, line);
        self.depth -= 1;
        res
    }

    fn execute_commands(&mut self, host: &mut dyn Host, line: &str) -> bool {
        let mut parser = Parser::new(line, self.radix);
        loop {
            let cmd = match parser.next_command() {
                Ok(Some(cmd)) => cmd,
                Ok(None) => break true,
                Err(err) => {
                    self.report(line, err);
                    break false;
                }
            };
            if let Err(err) = self.execute(host, cmd) {
                self.report(line, err);
                break false;
            }
            parser.radix = self.radix;
        }
    }

    fn record_line(&mut self, line: &str) {
        if let Some(file) = &mut self.record {
            if let Err(err) = writeln!(file, "{line}") {
                warn!("failed to record command: {err}");
            }
        }
    }

    fn execute(&mut self, host: &mut dyn Host, cmd: Command) -> Result<(), Error> {
        match cmd {
            Command::Step { count, over } => self.step(host, count, over)?,
            Command::Return => self.resume = Some(Resume::Return),
            Command::Goto(addr) => self.goto(host, addr)?,
            Command::Exit => self.resume = Some(Resume::Continue),
            Command::Quit => self.resume = Some(Resume::Quit),
            Command::Backtrace => self.backtrace(host),
            Command::Registers { space, assign } => self.registers(host, space, assign)?,
            Command::Cpu(model) => self.cpu(host, model),
            Command::Bank(name) => self.select_bank(host, name),

            Command::AddLabel { addr, name } => {
                let addr = self.addr(host, &addr)?;
                self.symbols.add(addr.space, name, addr.loc);
            }
            Command::DeleteLabel { space, name } => {
                let space = space.unwrap_or(self.device);
                if self.symbols.remove(space, name).is_none() {
                    mon_out!(self, "Label .{name} not found in {space}");
                }
            }
            Command::ShowLabels(space) => self.show_labels(space),
            Command::ClearLabels(space) => match space {
                Some(space) => self.symbols.clear(space),
                None => MemSpace::ALL.into_iter().for_each(|space| self.symbols.clear(space)),
            },
            Command::SaveLabels { space, file } => self.save_labels(space, &file),
            Command::LoadLabels { space, file } => self.load_labels(host, space, &file),

            Command::Assemble { addr, ins } => self.assemble(host, addr, ins)?,
            Command::Disassemble(range) => self.disassemble(host, range)?,

            Command::Memory { range, text_only } => self.memory(host, range, text_only)?,
            Command::Fill { range, data } => self.fill(host, range, data)?,
            Command::Move { range, dest } => self.move_memory(host, range, dest)?,
            Command::Compare { range, dest } => self.compare(host, range, dest)?,
            Command::Hunt { range, data } => self.hunt(host, range, data)?,
            Command::Write { addr, data } => self.write_data(host, addr, data)?,
            Command::Load { file, addr, raw } => self.load_file(host, &file, addr, raw)?,
            Command::Save { file, range, raw } => self.save_file(host, &file, range, raw)?,
            Command::Verify { file, addr } => self.verify_file(host, &file, addr)?,

            Command::Checkpoint { kind, ops, range, cond } => {
                self.add_checkpoint(host, kind, ops, range, cond)?
            }
            Command::Until(addr) => self.until(host, addr)?,
            Command::Condition { id, cond } => self.condition(host, id, cond)?,
            Command::CheckpointCommand { id, text } => self.checkpoint_command(id, text),
            Command::Enable(id) => self.switch_checkpoint(id, true),
            Command::Disable(id) => self.switch_checkpoint(id, false),
            Command::Ignore { id, count } => self.ignore(host, id, count)?,
            Command::Delete(id) => self.delete_checkpoint(id),

            Command::Radix(radix) => {
                if let Some(radix) = radix {
                    self.radix = radix;
                }
                mon_out!(self, "Default radix is {}", self.radix);
            }
            Command::Device(space) => {
                if let Some(space) = space {
                    self.device = space;
                }
                mon_out!(self, "Default memspace is {}", self.device);
            }
            Command::SideFx(toggle) => {
                match toggle {
                    Some(vmon_cmd::Toggle::On) => self.sidefx = true,
                    Some(vmon_cmd::Toggle::Off) => self.sidefx = false,
                    Some(vmon_cmd::Toggle::Flip) => self.sidefx = !self.sidefx,
                    None => (),
                }
                let state = if self.sidefx { "enabled" } else { "disabled" };
                mon_out!(self, "I/O side effects are {state}");
            }

            Command::Print(expr) => {
                let val = self.eval(host, &expr, self.device)?;
                let text = self.format_value(val, self.radix);
                mon_out!(self, "{text}");
            }
            Command::Convert(expr) => {
                let val = self.eval(host, &expr, self.device)?;
                mon_out!(
                    self,
                    "${}\n+{}\n&{}\n%{}",
                    self.format_value(val, Radix::Hex),
                    self.format_value(val, Radix::Dec),
                    self.format_value(val, Radix::Oct),
                    self.format_value(val, Radix::Bin),
                );
            }
            Command::Help(name) => self.help(name),
            Command::DiskCommand(text) => match host.disk_command(self.device, text) {
                Ok(reply) => mon_out!(self, "{reply}"),
                Err(err) => mon_out!(self, "Disk command failed: {err}"),
            },
            Command::ChDir(dir) => self.change_dir(&dir),
            Command::Pwd => self.print_dir(),
            Command::Dir(dir) => self.list_dir(dir.as_deref()),
            Command::Record(file) => self.start_recording(&file),
            Command::Stop => self.stop_recording(),
            Command::Playback(file) => self.playback(host, &file),
        }
        Ok(())
    }

    /// Format a value in 'radix'. Negative values are shown with a '-' sign.
    fn format_value(&self, val: i64, radix: Radix) -> String {
        let mag = val.unsigned_abs();
        let bits = match mag {
            0..=0xff => 8,
            0x100..=0xffff => 16,
            0x1_0000..=0xffff_ffff => 32,
            _ => 64,
        };
        let text = radix.format(mag, bits);
        if val < 0 {
            format!("-{text}")
        } else {
            text
        }
    }

    fn help(&mut self, name: Option<&str>) {
        let Some(name) = name else {
            mon_out!(self, "Available commands are:");
            let entries: Vec<String> = vmon_cmd::COMMANDS
                .iter()
                .map(|info| match info.abbrev {
                    Some(abbrev) => format!("{} ({abbrev})", info.name),
                    None => info.name.to_string(),
                })
                .collect();
            for row in entries.chunks(4) {
                let row: Vec<String> = row.iter().map(|entry| format!("{entry:<20}")).collect();
                mon_out!(self, "{}", row.concat().trim_end());
            }
            return;
        };
        match vmon_cmd::find_command(name) {
            Some(info) => {
                mon_out!(self, "Syntax: {} {}", info.name, info.params);
                if let Some(abbrev) = info.abbrev {
                    mon_out!(self, "Abbreviation: {abbrev}");
                }
                mon_out!(self, "{}", info.desc);
            }
            None => mon_out!(self, "Command `{name}' does not exist."),
        }
    }
}
