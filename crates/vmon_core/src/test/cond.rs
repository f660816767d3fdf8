use super::{monitor, run, FakeHost};
use crate::cond::CondNode;
use crate::monitor::Monitor;

use vmon_cmd::{CmpOp, LogicOp};
use vmon_util::{MemSpace, Op, Reg};

fn condition(mon: &Monitor, id: u32) -> CondNode {
    mon.checkpoints.get(id).unwrap().condition.clone().unwrap()
}

#[test]
fn registers_are_read_lazily() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "break c000 if a == 10");

    let cond = condition(&mon, 1);
    assert_eq!(cond, CondNode::Compare(
        CmpOp::Eq,
        Box::new(CondNode::Reg(MemSpace::Computer, Reg::A)),
        Box::new(CondNode::Const(0x10)),
    ));
    assert!(!cond.holds(&host));
    host.set(Reg::A, 0x10);
    assert!(cond.holds(&host));
}

#[test]
fn constant_arithmetic_is_folded() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, ".top = c0f0");
    run(&mut mon, &mut host, &out, "break c000 if pc == .top + (2 * 8)");

    assert_eq!(condition(&mon, 1), CondNode::Compare(
        CmpOp::Eq,
        Box::new(CondNode::Reg(MemSpace::Computer, Reg::PC)),
        Box::new(CondNode::Const(0xc100)),
    ));
}

#[test]
fn registers_in_arithmetic_are_rejected() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    assert_eq!(
        run(&mut mon, &mut host, &out, "break c000 if (a + 1) == 2"),
        "ERROR -- Invalid register:\n  break c000 if (a + 1) == 2\n                 ^\n",
    );
    assert!(mon.checkpoints.is_empty());

    run(&mut mon, &mut host, &out, "break c000 if a == 1");
    assert_eq!(
        run(&mut mon, &mut host, &out, "condition 1 if x == 1 && 2 * y == 4"),
        "ERROR -- Invalid register:\n  condition 1 if x == 1 && 2 * y == 4\n                               ^\n",
    );
    assert_eq!(condition(&mon, 1).to_string(), "C:A == $1");

    assert!(!mon.check_checkpoint(&mut host, MemSpace::Computer, 0xc000, 0xc000, Op::Exec));
    host.set(Reg::A, 1);
    assert!(mon.check_checkpoint(&mut host, MemSpace::Computer, 0xc000, 0xc000, Op::Exec));
}

#[test]
fn registers_default_to_checkpoint_space() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "break 8:0300 if y == 0 && c:x == 1");

    assert_eq!(condition(&mon, 1), CondNode::Logical(
        LogicOp::And,
        Box::new(CondNode::Compare(
            CmpOp::Eq,
            Box::new(CondNode::Reg(MemSpace::Disk8, Reg::Y)),
            Box::new(CondNode::Const(0)),
        )),
        Box::new(CondNode::Compare(
            CmpOp::Eq,
            Box::new(CondNode::Reg(MemSpace::Computer, Reg::X)),
            Box::new(CondNode::Const(1)),
        )),
    ));
}

#[test]
fn unreadable_register_is_false() {
    let host = FakeHost::default();
    let cond = CondNode::Compare(
        CmpOp::Ne,
        Box::new(CondNode::Reg(MemSpace::Computer, Reg::IX)),
        Box::new(CondNode::Const(1)),
    );
    assert_eq!(cond.evaluate(&host), None);
    assert!(!cond.holds(&host));
}

#[test]
fn display() {
    let cond = CondNode::Logical(
        LogicOp::Or,
        Box::new(CondNode::Compare(
            CmpOp::Le,
            Box::new(CondNode::Reg(MemSpace::Disk9, Reg::A)),
            Box::new(CondNode::Const(-0x1f)),
        )),
        Box::new(CondNode::Reg(MemSpace::Computer, Reg::FL)),
    );
    assert_eq!(cond.to_string(), "(9:A <= -$1f) || C:FL");
}

#[test]
fn print_and_parse_again() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    let conds = [
        "a == 5 && x == (4 * 2)",
        "a > 1 || x < 2 && y != 3",
        "(a >= 2 || x <= 1) && 8:a == $ff",
        "a == -3 || fl",
    ];
    for (i, cond) in conds.iter().enumerate() {
        let id = i as u32 + 1;
        run(&mut mon, &mut host, &out, &format!("break c00{i} if {cond}"));
        let printed = condition(&mon, id).to_string();
        let reply = run(&mut mon, &mut host, &out, &format!("condition {id} if {printed}"));
        assert_eq!(reply.trim_end(), format!("Setting checkpoint {id} condition to: {printed}"));
    }

    let states = [(0, 0, 0), (5, 7, 3), (2, 1, 0), (1, 9, 3), (0xff, 2, 1)];
    for (a, x, y) in states {
        host.set(Reg::A, a);
        host.set(Reg::X, x);
        host.set(Reg::Y, y);
        host.regs.insert((MemSpace::Disk8, Reg::A), a);
        host.set(Reg::FL, y);
        for id in 1..=conds.len() as u32 {
            let cond = condition(&mon, id);
            let text = cond.to_string();
            let (mut other, out) = monitor();
            run(&mut other, &mut host, &out, &format!("break c000 if {text}"));
            assert_eq!(cond.evaluate(&host), condition(&other, 1).evaluate(&host), "{text}");
        }
    }
}

#[test]
fn smallest_constant_is_printed_as_expression() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "break c000 if a == (-$7fffffffffffffff - 1)");

    let cond = condition(&mon, 1);
    assert_eq!(cond.to_string(), "C:A == (-$7fffffffffffffff - 1)");
    let printed = cond.to_string();
    assert_eq!(
        run(&mut mon, &mut host, &out, &format!("condition 1 if {printed}")),
        format!("Setting checkpoint 1 condition to: {printed}\n"),
    );
    assert_eq!(condition(&mon, 1), cond);
}
