//! Called by the machine on every instruction fetch and memory access which may hit a
//! checkpoint.

use crate::checkpoint::CheckpointId;
use crate::host::Host;
use super::{mon_out, Monitor};

use vmon_util::{Addr, MemSpace, Op, Reg};

impl Monitor {
    /// Check the checkpoints of 'space' triggered by 'op' at 'loc'. 'last_pc' is the address of
    /// the instruction doing the access. Every matching checkpoint fires, not only the first
    /// one. Returns true if any of them should stop execution.
    ///
    /// Checkpoint commands may add or delete checkpoints, including the ones being checked.
    pub fn check_checkpoint(
        &mut self,
        host: &mut dyn Host,
        space: MemSpace,
        loc: u16,
        last_pc: u16,
        op: Op,
    ) -> bool {
        let ids = self.checkpoints.find(space, op, loc);
        let mut stop = false;
        for id in ids {
            if self.fire(host, id, space, loc, last_pc, op) {
                stop = true;
            }
        }
        stop
    }

    /// Fire a checkpoint if it's enabled, it's condition holds and it isn't ignored. Returns
    /// true if it should stop execution.
    fn fire(
        &mut self,
        host: &mut dyn Host,
        id: CheckpointId,
        space: MemSpace,
        loc: u16,
        last_pc: u16,
        op: Op,
    ) -> bool {
        let Ok(cp) = self.checkpoints.get_mut(id) else {
            return false;
        };
        if !cp.enabled {
            return false;
        }
        if let Some(cond) = &cp.condition {
            if !cond.holds(host) {
                return false;
            }
        }
        if cp.ignore_count > 0 {
            cp.ignore_count -= 1;
            return false;
        }
        cp.hit_count += 1;

        let (stop, temporary) = (cp.stop, cp.temporary);
        let command = cp.command.clone();
        let info = cp.info(true);

        trace!("checkpoint #{id} hit at {} by {op}", Addr::new(space, loc));
        self.observer.checkpoint_hit(&info);

        if op == Op::Exec {
            self.switch_cpu_to_pc(host, space, loc);
        }

        let kind = if stop { "Stop on" } else { "Trace" };
        let timing = host
            .timing(space)
            .map(|t| format!(" {:3}/${:03x}, {:3}/${:02x}", t.line, t.line, t.cycle, t.cycle))
            .unwrap_or_default();
        mon_out!(self, "#{id} ({kind} {:>5} {loc:04x}){timing}", op.name());

        let pc = match op {
            Op::Exec => host.register(space, Reg::PC).unwrap_or(loc),
            Op::Load | Op::Store => last_pc,
        };
        self.disassemble_with_regdump(host, Addr::new(space, pc));

        if let Some(command) = command {
            mon_out!(self, "Executing: {command}");
            let pending = self.resume.take();
            self.execute_line(host, &command);
            // Only checkpoints which stop execution can tell the machine how to continue.
            if !stop || self.resume.is_none() {
                self.resume = pending;
            }
        }
        if temporary {
            // The command may already have deleted it.
            let _ = self.checkpoints.delete(id);
        }
        stop
    }

    /// Some machines have several processor models sharing a memspace. If the active one isn't
    /// at 'loc' but another one is, make that one active.
    fn switch_cpu_to_pc(&mut self, host: &mut dyn Host, space: MemSpace, loc: u16) {
        if host.register(space, Reg::PC) == Some(loc) {
            return;
        }
        let active = host.cpu_model(space);
        let model = host
            .cpu_models(space)
            .into_iter()
            .filter(|model| Some(*model) != active)
            .find(|model| host.model_pc(space, model) == Some(loc));
        if let Some(model) = model {
            match host.set_cpu_model(space, model) {
                Ok(()) => info!("switched {space} to processor {model} at ${loc:04x}"),
                Err(err) => warn!("failed to switch {space} to processor {model}: {err}"),
            }
        }
    }
}
