use super::{mon_out, Monitor};
use crate::host::Host;

use vmon_cmd::{AddrArg, Command, Error, Parser, Range};
use vmon_util::{Addr, MemSpace, Radix};

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

impl Monitor {
    pub(super) fn show_labels(&mut self, space: Option<MemSpace>) {
        let space = space.unwrap_or(self.device);
        let labels: Vec<String> = self.symbols
            .iter(space)
            .map(|(name, loc)| format!("{} .{name}", Addr::new(space, loc)))
            .collect();
        if labels.is_empty() {
            mon_out!(self, "No labels defined for {space}");
        }
        for label in labels {
            mon_out!(self, "{label}");
        }
    }

    /// Write labels as 'al' commands, so they can be loaded again with 'll' or 'playback'.
    pub(super) fn save_labels(&mut self, space: Option<MemSpace>, file: &str) {
        let spaces = match space {
            Some(space) => vec![space],
            None => MemSpace::ALL.to_vec(),
        };
        let mut text = String::new();
        let mut count = 0;
        for space in spaces {
            for (name, loc) in self.symbols.iter(space) {
                text.push_str(&format!("al {} .{name}\n", Addr::new(space, loc)));
                count += 1;
            }
        }
        match fs::write(file, text) {
            Ok(()) => mon_out!(self, "Saved {count} labels to `{file}'"),
            Err(err) => mon_out!(self, "Can't write `{file}': {err}"),
        }
    }

    /// Load labels written by 'sl'. Lines which aren't 'al' commands are skipped. If 'space'
    /// is given, all labels are added to it.
    pub(super) fn load_labels(&mut self, host: &dyn Host, space: Option<MemSpace>, file: &str) {
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                mon_out!(self, "Can't open `{file}': {err}");
                return;
            }
        };
        let mut count = 0;
        for (num, line) in text.lines().enumerate() {
            let cmd = match Parser::new(line, Radix::Hex).next_command() {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(err) => {
                    mon_out!(self, "{file}:{}: {err}", num + 1);
                    continue;
                }
            };
            let Command::AddLabel { addr, name } = cmd else {
                warn!("{file}:{}: not a label definition", num + 1);
                continue;
            };
            let addr = match self.addr(host, &addr) {
                Ok(addr) => addr,
                Err(err) => {
                    mon_out!(self, "{file}:{}: {err}", num + 1);
                    continue;
                }
            };
            self.symbols.add(space.unwrap_or(addr.space), name, addr.loc);
            count += 1;
        }
        mon_out!(self, "Loaded {count} labels from `{file}'");
    }

    /// Load a file into memory. Unless 'raw' is set, the file starts with the address to load
    /// it at, which 'addr' overrides.
    pub(super) fn load_file(
        &mut self,
        host: &mut dyn Host,
        file: &str,
        addr: Option<AddrArg>,
        raw: bool,
    ) -> Result<(), Error> {
        let addr = addr.map(|addr| self.addr(host, &addr)).transpose()?;
        let data = match fs::read(file) {
            Ok(data) => data,
            Err(err) => {
                mon_out!(self, "Can't open `{file}': {err}");
                return Ok(());
            }
        };
        let (header, body) = match (raw, data.as_slice()) {
            (false, [lo, hi, body @ ..]) => (Some(u16::from_le_bytes([*lo, *hi])), body),
            (false, _) => {
                mon_out!(self, "`{file}' is too short to have a load address");
                return Ok(());
            }
            (true, body) => (None, body),
        };
        let start = match (addr, header) {
            (Some(addr), _) => addr,
            (None, Some(loc)) => Addr::new(self.device, loc),
            (None, None) => {
                mon_out!(self, "No load address given for `{file}'");
                return Ok(());
            }
        };
        let len = body.len().min(0x10000 - start.loc as usize);
        for (i, byte) in body[..len].iter().enumerate() {
            host.write(start.offset(i as u16), *byte);
        }
        let end = start.offset(len.saturating_sub(1) as u16);
        mon_out!(self, "Loading {file} from ${:04x} to ${:04x} ({len:x} bytes)", start.loc, end.loc);
        Ok(())
    }

    pub(super) fn save_file(
        &mut self,
        host: &mut dyn Host,
        file: &str,
        range: Range,
        raw: bool,
    ) -> Result<(), Error> {
        let (start, end) = self.range(host, &range)?;
        let end = end.unwrap_or(start);
        let mut data = Vec::new();
        if !raw {
            data.extend_from_slice(&start.loc.to_le_bytes());
        }
        for loc in start.loc..=end.loc {
            data.push(self.read_byte(host, Addr::new(start.space, loc)));
        }
        match fs::write(file, data) {
            Ok(()) => mon_out!(
                self,
                "Saving file `{file}' from ${:04x} to ${:04x}",
                start.loc,
                end.loc,
            ),
            Err(err) => mon_out!(self, "Can't write `{file}': {err}"),
        }
        Ok(())
    }

    /// Compare memory at 'addr' with a file written by 'save'.
    pub(super) fn verify_file(
        &mut self,
        host: &mut dyn Host,
        file: &str,
        addr: AddrArg,
    ) -> Result<(), Error> {
        let addr = self.addr(host, &addr)?;
        let data = match fs::read(file) {
            Ok(data) => data,
            Err(err) => {
                mon_out!(self, "Can't open `{file}': {err}");
                return Ok(());
            }
        };
        let body = data.get(2..).unwrap_or_default();
        let mut diffs = 0;
        for (i, byte) in body.iter().enumerate().take(0x10000 - addr.loc as usize) {
            let at = addr.offset(i as u16);
            let mem = self.read_byte(host, at);
            if mem != *byte {
                mon_out!(self, "${:04x}: file {byte:02x}, memory {mem:02x}", at.loc);
                diffs += 1;
            }
        }
        if diffs == 0 {
            mon_out!(self, "Verify of `{file}' ok");
        }
        Ok(())
    }

    pub(super) fn change_dir(&mut self, dir: &str) {
        match std::env::set_current_dir(dir) {
            Ok(()) => self.print_dir(),
            Err(err) => mon_out!(self, "Can't change directory to `{dir}': {err}"),
        }
    }

    pub(super) fn print_dir(&mut self) {
        match std::env::current_dir() {
            Ok(dir) => mon_out!(self, "Current directory is `{}'", dir.display()),
            Err(err) => mon_out!(self, "Can't get current directory: {err}"),
        }
    }

    pub(super) fn list_dir(&mut self, dir: Option<&str>) {
        let dir = Path::new(dir.unwrap_or("."));
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                mon_out!(self, "Can't list `{}': {err}", dir.display());
                return;
            }
        };
        let mut lines: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                match entry.metadata() {
                    Ok(meta) if meta.is_dir() => format!("{:>10}  {name}/", "<dir>"),
                    Ok(meta) => format!("{:>10}  {name}", meta.len()),
                    Err(_) => format!("{:>10}  {name}", "?"),
                }
            })
            .collect();
        lines.sort_by(|a, b| a[12..].cmp(&b[12..]));
        for line in lines {
            mon_out!(self, "{line}");
        }
    }

    /// Record the command lines typed from now on to 'file'.
    pub(super) fn start_recording(&mut self, file: &str) {
        if self.record.is_some() {
            mon_out!(self, "Recording already in progress, use 'stop' to end it");
            return;
        }
        match File::create(file) {
            Ok(handle) => {
                self.record = Some(handle);
                mon_out!(self, "Recording commands to `{file}'");
            }
            Err(err) => mon_out!(self, "Can't create `{file}': {err}"),
        }
    }

    pub(super) fn stop_recording(&mut self) {
        match self.record.take() {
            Some(mut file) => {
                if let Err(err) = file.flush() {
                    warn!("failed to flush recording: {err}");
                }
                mon_out!(self, "Stopped recording");
            }
            None => mon_out!(self, "Not recording"),
        }
    }

    /// Execute each line of 'file' as if it was typed.
    pub fn playback(&mut self, host: &mut dyn Host, file: &str) {
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                mon_out!(self, "Can't open `{file}': {err}");
                return;
            }
        };
        debug!("playing back `{file}'");
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            self.execute_line(host, line);
        }
    }
}
