use crate::cond::CondNode;
use crate::event::CheckpointInfo;

use vmon_util::{Addr, MemSpace, Op, Ops};

use std::collections::BTreeMap;
use std::fmt;

pub type CheckpointId = u32;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("#{0} not a valid checkpoint")]
    Unknown(CheckpointId),
}

/// The state of the exec checkpoint at an address, as shown by click-to-toggle interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointStatus {
    None,
    Active,
    Inactive,
}

/// A breakpoint, watchpoint or tracepoint. Covers the inclusive range from 'start' to 'end',
/// which are always in the same memspace.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub start: Addr,
    pub end: Addr,
    pub ops: Ops,
    /// Stop execution and enter the monitor when hit. Otherwise only report the hit.
    pub stop: bool,
    pub enabled: bool,
    /// Delete the checkpoint the first time it's hit.
    pub temporary: bool,
    pub hit_count: u32,
    /// The amount of future hits which should be ignored.
    pub ignore_count: u32,
    pub condition: Option<CondNode>,
    /// Command line executed each time the checkpoint is hit.
    pub command: Option<String>,
}

impl Checkpoint {
    pub fn space(&self) -> MemSpace {
        self.start.space
    }

    pub fn contains(&self, loc: u16) -> bool {
        (self.start.loc..=self.end.loc).contains(&loc)
    }

    fn kind_name(&self) -> &'static str {
        if !self.stop {
            "TRACE"
        } else if self.ops.contains(Op::Load) || self.ops.contains(Op::Store) {
            "WATCH"
        } else if self.temporary {
            "UNTIL"
        } else {
            "BREAK"
        }
    }

    /// Snapshot used to notify observers. 'hit' is set if the checkpoint has just triggered.
    pub fn info(&self, hit: bool) -> CheckpointInfo {
        CheckpointInfo {
            id: self.id,
            hit,
            space: self.space(),
            start: self.start.loc,
            end: self.end.loc,
            ops: self.ops,
            stop: self.stop,
            enabled: self.enabled,
            temporary: self.temporary,
            hit_count: self.hit_count,
            ignore_count: self.ignore_count,
            condition: self.condition.as_ref().map(|cond| cond.to_string()),
            command: self.command.clone(),
        }
    }
}

/// Writes the listing of a checkpoint, fx:
///
/// ```text
/// WATCH: 2  C:$d020-$d02e  (Stop on store)
///     Condition: C:A == $10
/// ```
impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}  {}", self.kind_name(), self.id, self.start)?;
        if self.end != self.start {
            write!(f, "-${:04x}", self.end.loc)?;
        }
        f.write_str(if self.stop { "  (Stop on" } else { "  (Trace" })?;
        for op in [Op::Load, Op::Store, Op::Exec] {
            if self.ops.contains(op) {
                write!(f, " {op}")?;
            }
        }
        f.write_str(")")?;
        if !self.enabled {
            f.write_str(" disabled")?;
        }
        if let Some(cond) = &self.condition {
            write!(f, "\n\tCondition: {cond}")?;
        }
        if let Some(cmd) = &self.command {
            write!(f, "\n\tCommand: {cmd}")?;
        }
        Ok(())
    }
}

/// Owns all checkpoints. Besides the table of all checkpoints, there is an index for each
/// memspace and operation, holding the ids of the checkpoints triggered by it sorted by start
/// address. Checkpoints are only ever referenced by id outside the table.
pub struct Checkpoints {
    table: BTreeMap<CheckpointId, Checkpoint>,
    index: [[Vec<CheckpointId>; 3]; MemSpace::COUNT],
    /// The id given to the next checkpoint. Goes back to 1 whenever the registry is emptied.
    next_id: CheckpointId,
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self {
            table: BTreeMap::new(),
            index: Default::default(),
            next_id: 1,
        }
    }
}

impl Checkpoints {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.table.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: CheckpointId) -> Result<&mut Checkpoint, CheckpointError> {
        self.table.get_mut(&id).ok_or(CheckpointError::Unknown(id))
    }

    /// All checkpoints ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &Checkpoint> {
        self.table.values()
    }

    fn index(&self, space: MemSpace, op: Op) -> &Vec<CheckpointId> {
        &self.index[space.index()][op.index()]
    }

    fn start_of(&self, id: CheckpointId) -> u16 {
        self.table.get(&id).map_or(0, |cp| cp.start.loc)
    }

    /// Add a new checkpoint covering 'start' to 'end'. Returns the id of the new checkpoint.
    pub fn add(
        &mut self,
        start: Addr,
        end: Addr,
        ops: Ops,
        stop: bool,
        temporary: bool,
    ) -> CheckpointId {
        debug_assert_eq!(start.space, end.space);
        debug_assert!(start.loc <= end.loc);

        let id = self.next_id;
        self.next_id += 1;

        self.table.insert(id, Checkpoint {
            id,
            start,
            end,
            ops,
            stop,
            enabled: true,
            temporary,
            hit_count: 0,
            ignore_count: 0,
            condition: None,
            command: None,
        });

        for op in ops.iter() {
            // Insert after checkpoints with the same start address, to keep them in the order
            // they were added.
            let pos = self.index(start.space, op)
                .partition_point(|other| self.start_of(*other) <= start.loc);
            self.index[start.space.index()][op.index()].insert(pos, id);
        }

        debug!("added checkpoint #{id} at {start}-{end} for {ops:?}");
        id
    }

    /// Delete a checkpoint. The checkpoint is returned, so it's condition and command are
    /// dropped once the caller is done with it.
    pub fn delete(&mut self, id: CheckpointId) -> Result<Checkpoint, CheckpointError> {
        let cp = self.table.remove(&id).ok_or(CheckpointError::Unknown(id))?;
        for op in cp.ops.iter() {
            self.index[cp.space().index()][op.index()].retain(|other| *other != id);
        }
        if self.table.is_empty() {
            self.next_id = 1;
        }
        debug!("deleted checkpoint #{id}");
        Ok(cp)
    }

    pub fn delete_all(&mut self) {
        self.table.clear();
        self.index.iter_mut().flatten().for_each(Vec::clear);
        self.next_id = 1;
        debug!("deleted all checkpoints");
    }

    /// Enable or disable a single checkpoint, or all of them if 'id' is 'None'.
    pub fn set_enabled(
        &mut self,
        id: Option<CheckpointId>,
        enabled: bool,
    ) -> Result<(), CheckpointError> {
        match id {
            Some(id) => self.get_mut(id)?.enabled = enabled,
            None => self.table.values_mut().for_each(|cp| cp.enabled = enabled),
        }
        debug!("set checkpoint {id:?} enabled: {enabled}");
        Ok(())
    }

    pub fn set_ignore_count(&mut self, id: CheckpointId, count: u32) -> Result<(), CheckpointError> {
        self.get_mut(id)?.ignore_count = count;
        Ok(())
    }

    /// Attach a condition to a checkpoint, replacing any previous one.
    pub fn set_condition(
        &mut self,
        id: CheckpointId,
        cond: CondNode,
    ) -> Result<(), CheckpointError> {
        self.get_mut(id)?.condition = Some(cond);
        Ok(())
    }

    pub fn set_command(&mut self, id: CheckpointId, cmd: String) -> Result<(), CheckpointError> {
        self.get_mut(id)?.command = Some(cmd);
        Ok(())
    }

    /// The checkpoints in 'space' triggered by 'op' which cover 'loc', in order of start address.
    pub fn find(&self, space: MemSpace, op: Op, loc: u16) -> Vec<CheckpointId> {
        self.index(space, op)
            .iter()
            .map_while(|id| self.table.get(id))
            .take_while(|cp| cp.start.loc <= loc)
            .filter(|cp| cp.contains(loc))
            .map(|cp| cp.id)
            .collect()
    }

    /// The first exec checkpoint covering 'addr'.
    fn first_exec_at(&self, addr: Addr) -> Option<CheckpointId> {
        self.find(addr.space, Op::Exec, addr.loc).first().copied()
    }

    pub fn status_at(&self, addr: Addr) -> CheckpointStatus {
        match self.first_exec_at(addr).and_then(|id| self.get(id)) {
            Some(cp) if cp.enabled => CheckpointStatus::Active,
            Some(_) => CheckpointStatus::Inactive,
            None => CheckpointStatus::None,
        }
    }

    /// Add a breakpoint at 'addr' if there is none, otherwise flip whether it's enabled.
    /// Returns the new status.
    pub fn toggle_at(&mut self, addr: Addr) -> CheckpointStatus {
        match self.first_exec_at(addr) {
            Some(id) => {
                if let Ok(cp) = self.get_mut(id) {
                    cp.enabled = !cp.enabled;
                }
            }
            None => {
                self.add(addr, addr, Ops::EXEC, true, false);
            }
        }
        self.status_at(addr)
    }

    /// Enable the breakpoint at 'addr', or add one if there is none.
    pub fn set_at(&mut self, addr: Addr) {
        match self.first_exec_at(addr) {
            Some(id) => {
                if let Ok(cp) = self.get_mut(id) {
                    cp.enabled = true;
                }
            }
            None => {
                self.add(addr, addr, Ops::EXEC, true, false);
            }
        }
    }

    /// Delete the breakpoint at 'addr' if there is one.
    pub fn unset_at(&mut self, addr: Addr) {
        if let Some(id) = self.first_exec_at(addr) {
            let _ = self.delete(id);
        }
    }

    pub fn enable_at(&mut self, addr: Addr) {
        if let Some(id) = self.first_exec_at(addr) {
            let _ = self.set_enabled(Some(id), true);
        }
    }

    pub fn disable_at(&mut self, addr: Addr) {
        if let Some(id) = self.first_exec_at(addr) {
            let _ = self.set_enabled(Some(id), false);
        }
    }
}
