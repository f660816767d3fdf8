use crate::checkpoint::{CheckpointError, CheckpointStatus, Checkpoints};

use vmon_util::{Addr, MemSpace, Op, Ops};

fn addr(loc: u16) -> Addr {
    Addr::new(MemSpace::Computer, loc)
}

#[test]
fn ids_increase_and_reset() {
    let mut cps = Checkpoints::default();
    let ids: Vec<u32> = (0..4)
        .map(|i| cps.add(addr(i * 0x10), addr(i * 0x10), Ops::EXEC, true, false))
        .collect();
    assert_eq!(ids, [1, 2, 3, 4]);

    cps.delete(2).unwrap();
    assert_eq!(cps.add(addr(0x100), addr(0x100), Ops::EXEC, true, false), 5);

    cps.delete_all();
    assert!(cps.is_empty());
    assert_eq!(cps.add(addr(0x100), addr(0x100), Ops::EXEC, true, false), 1);
}

#[test]
fn ids_reset_when_last_is_deleted() {
    let mut cps = Checkpoints::default();
    let a = cps.add(addr(0), addr(0), Ops::EXEC, true, false);
    let b = cps.add(addr(1), addr(1), Ops::EXEC, true, false);
    cps.delete(a).unwrap();
    cps.delete(b).unwrap();
    assert_eq!(cps.add(addr(2), addr(2), Ops::EXEC, true, false), 1);
}

#[test]
fn find_by_range_and_op() {
    let mut cps = Checkpoints::default();
    let wide = cps.add(addr(0xd000), addr(0xdfff), Ops::LOAD | Ops::STORE, true, false);
    let narrow = cps.add(addr(0xd020), addr(0xd02e), Ops::STORE, true, false);
    let early = cps.add(addr(0x0800), addr(0xd021), Ops::STORE, false, false);
    let exec = cps.add(addr(0xd020), addr(0xd020), Ops::EXEC, true, false);

    // Sorted by start address, not by id.
    assert_eq!(cps.find(MemSpace::Computer, Op::Store, 0xd020), [early, wide, narrow]);
    assert_eq!(cps.find(MemSpace::Computer, Op::Store, 0xd025), [wide, narrow]);
    assert_eq!(cps.find(MemSpace::Computer, Op::Load, 0xd025), [wide]);
    assert_eq!(cps.find(MemSpace::Computer, Op::Exec, 0xd020), [exec]);
    assert!(cps.find(MemSpace::Computer, Op::Store, 0xe000).is_empty());
    assert!(cps.find(MemSpace::Disk8, Op::Store, 0xd020).is_empty());
}

#[test]
fn find_after_delete() {
    let mut cps = Checkpoints::default();
    let a = cps.add(addr(0x1000), addr(0x1000), Ops::EXEC, true, false);
    let b = cps.add(addr(0x1000), addr(0x1000), Ops::EXEC, true, false);
    assert_eq!(cps.find(MemSpace::Computer, Op::Exec, 0x1000), [a, b]);
    cps.delete(a).unwrap();
    assert_eq!(cps.find(MemSpace::Computer, Op::Exec, 0x1000), [b]);
}

#[test]
fn disabled_is_still_listed() {
    let mut cps = Checkpoints::default();
    let id = cps.add(addr(0xc000), addr(0xc000), Ops::EXEC, true, false);
    cps.set_enabled(Some(id), false).unwrap();
    assert_eq!(cps.find(MemSpace::Computer, Op::Exec, 0xc000), [id]);
    assert_eq!(cps.list().count(), 1);
    assert!(!cps.get(id).unwrap().enabled);
}

#[test]
fn unknown_id() {
    let mut cps = Checkpoints::default();
    assert_eq!(cps.delete(3).unwrap_err(), CheckpointError::Unknown(3));
    assert_eq!(cps.set_enabled(Some(3), true), Err(CheckpointError::Unknown(3)));
    assert_eq!(cps.set_ignore_count(3, 1), Err(CheckpointError::Unknown(3)));
    assert_eq!(CheckpointError::Unknown(3).to_string(), "#3 not a valid checkpoint");
}

#[test]
fn toggle_at_cycles() {
    let mut cps = Checkpoints::default();
    let at = addr(0xc010);
    assert_eq!(cps.status_at(at), CheckpointStatus::None);
    assert_eq!(cps.toggle_at(at), CheckpointStatus::Active);
    assert_eq!(cps.toggle_at(at), CheckpointStatus::Inactive);
    assert_eq!(cps.toggle_at(at), CheckpointStatus::Active);
    assert_eq!(cps.len(), 1);

    cps.disable_at(at);
    assert_eq!(cps.status_at(at), CheckpointStatus::Inactive);
    cps.set_at(at);
    assert_eq!(cps.status_at(at), CheckpointStatus::Active);
    cps.unset_at(at);
    assert_eq!(cps.status_at(at), CheckpointStatus::None);
    assert!(cps.is_empty());
}

#[test]
fn toggle_ignores_watchpoints() {
    let mut cps = Checkpoints::default();
    cps.add(addr(0xc000), addr(0xc0ff), Ops::STORE, true, false);
    assert_eq!(cps.status_at(addr(0xc010)), CheckpointStatus::None);
    cps.set_at(addr(0xc010));
    assert_eq!(cps.len(), 2);
}

#[test]
fn listing() {
    let mut cps = Checkpoints::default();
    let brk = cps.add(addr(0xc000), addr(0xc000), Ops::EXEC, true, false);
    let watch = cps.add(addr(0xd020), addr(0xd02e), Ops::LOAD | Ops::STORE, true, false);
    let trace = cps.add(addr(0x1000), addr(0x1000), Ops::EXEC | Ops::STORE, false, false);
    let until = cps.add(addr(0xc100), addr(0xc100), Ops::EXEC, true, true);
    cps.set_enabled(Some(trace), false).unwrap();
    cps.set_command(brk, "m 1000".to_string()).unwrap();

    let text = |id| cps.get(id).unwrap().to_string();
    assert_eq!(text(brk), "BREAK: 1  C:$c000  (Stop on exec)\n\tCommand: m 1000");
    assert_eq!(text(watch), "WATCH: 2  C:$d020-$d02e  (Stop on load store)");
    assert_eq!(text(trace), "TRACE: 3  C:$1000  (Trace store exec) disabled");
    assert_eq!(text(until), "UNTIL: 4  C:$c100  (Stop on exec)");
}
