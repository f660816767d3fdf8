use super::{mon_out, Monitor};
use crate::checkpoint::{CheckpointError, CheckpointId};
use crate::host::Host;

use vmon_cmd::{AddrArg, CheckpointKind, CondExpr, Error, Expr, Range};
use vmon_util::Ops;

impl Monitor {
    fn report_checkpoint_error(&mut self, err: CheckpointError) {
        mon_out!(self, "{err}");
    }

    pub(super) fn list_checkpoints(&mut self) {
        if self.checkpoints.is_empty() {
            mon_out!(self, "No breakpoints are set");
            return;
        }
        let listing: Vec<String> = self.checkpoints.list().map(|cp| cp.to_string()).collect();
        for entry in listing {
            mon_out!(self, "{entry}");
        }
    }

    fn print_checkpoint(&mut self, id: CheckpointId) {
        if let Some(text) = self.checkpoints.get(id).map(|cp| cp.to_string()) {
            mon_out!(self, "{text}");
        }
    }

    /// Add a checkpoint, or list all of them if no range is given.
    pub(super) fn add_checkpoint(
        &mut self,
        host: &dyn Host,
        kind: CheckpointKind,
        ops: Ops,
        range: Option<Range>,
        cond: Option<CondExpr>,
    ) -> Result<(), Error> {
        let Some(range) = range else {
            self.list_checkpoints();
            return Ok(());
        };
        let (start, end) = self.range(host, &range)?;
        let cond = cond
            .map(|cond| self.cond_node(host, &cond, start.space))
            .transpose()?;
        let id = self.checkpoints.add(start, end.unwrap_or(start), ops, kind.stops(), false);
        if let Some(cond) = cond {
            // The checkpoint was just added, so it can't be missing.
            let _ = self.checkpoints.set_condition(id, cond);
        }
        self.print_checkpoint(id);
        Ok(())
    }

    /// Add a temporary breakpoint and continue execution. Without an address it's the same as
    /// 'goto' without address.
    pub(super) fn until(&mut self, host: &mut dyn Host, addr: Option<AddrArg>) -> Result<(), Error> {
        if let Some(addr) = addr {
            let addr = self.addr(host, &addr)?;
            let id = self.checkpoints.add(addr, addr, Ops::EXEC, true, true);
            debug!("until {addr} using checkpoint #{id}");
        }
        self.goto(host, None)
    }

    pub(super) fn condition(
        &mut self,
        host: &dyn Host,
        id: CheckpointId,
        cond: CondExpr,
    ) -> Result<(), Error> {
        let Some(space) = self.checkpoints.get(id).map(|cp| cp.space()) else {
            self.report_checkpoint_error(CheckpointError::Unknown(id));
            return Ok(());
        };
        let cond = self.cond_node(host, &cond, space)?;
        let text = cond.to_string();
        match self.checkpoints.set_condition(id, cond) {
            Ok(()) => mon_out!(self, "Setting checkpoint {id} condition to: {text}"),
            Err(err) => self.report_checkpoint_error(err),
        }
        Ok(())
    }

    pub(super) fn checkpoint_command(&mut self, id: CheckpointId, text: String) {
        let shown = text.clone();
        match self.checkpoints.set_command(id, text) {
            Ok(()) => mon_out!(self, "Setting checkpoint {id} command to: {shown}"),
            Err(err) => self.report_checkpoint_error(err),
        }
    }

    pub(super) fn switch_checkpoint(&mut self, id: Option<CheckpointId>, enabled: bool) {
        match self.checkpoints.set_enabled(id, enabled) {
            Ok(()) if id.is_none() => {
                let state = if enabled { "enabled" } else { "disabled" };
                mon_out!(self, "Set all checkpoints to state: {state}");
            }
            Ok(()) => (),
            Err(err) => self.report_checkpoint_error(err),
        }
    }

    /// Ignore the next 'count' hits of a checkpoint. Defaults to a single hit.
    pub(super) fn ignore(
        &mut self,
        host: &dyn Host,
        id: CheckpointId,
        count: Option<Expr>,
    ) -> Result<(), Error> {
        let count = match count {
            Some(expr) => self.eval(host, &expr, self.device)?.clamp(0, u32::MAX as i64) as u32,
            None => 1,
        };
        match self.checkpoints.set_ignore_count(id, count) {
            Ok(()) => mon_out!(self, "Will ignore the next {count} hits of checkpoint #{id}"),
            Err(err) => self.report_checkpoint_error(err),
        }
        Ok(())
    }

    pub(super) fn delete_checkpoint(&mut self, id: Option<CheckpointId>) {
        let Some(id) = id else {
            mon_out!(self, "Deleting all checkpoints");
            self.checkpoints.delete_all();
            return;
        };
        if let Err(err) = self.checkpoints.delete(id) {
            self.report_checkpoint_error(err);
        }
    }
}
