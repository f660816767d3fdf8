use super::{monitor, run, FakeHost};
use crate::host::Host;
use crate::monitor::Resume;

use vmon_util::{MemSpace, Reg};

use std::path::PathBuf;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("vmon_{}_{name}", std::process::id()))
}

#[test]
fn checkpoint_commands() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    assert_eq!(run(&mut mon, &mut host, &out, "break"), "No breakpoints are set\n");
    assert_eq!(
        run(&mut mon, &mut host, &out, "break c000"),
        "BREAK: 1  C:$c000  (Stop on exec)\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "watch d020 d02e if a == 1"),
        "WATCH: 2  C:$d020-$d02e  (Stop on load store)\n\tCondition: C:A == $1\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "disable all"),
        "Set all checkpoints to state: disabled\n",
    );
    assert_eq!(run(&mut mon, &mut host, &out, "enable 2"), "");
    assert_eq!(
        run(&mut mon, &mut host, &out, "bk"),
        "BREAK: 1  C:$c000  (Stop on exec) disabled\n\
         WATCH: 2  C:$d020-$d02e  (Stop on load store)\n\tCondition: C:A == $1\n",
    );
    assert_eq!(run(&mut mon, &mut host, &out, "delete 7"), "#7 not a valid checkpoint\n");
    assert_eq!(run(&mut mon, &mut host, &out, "ignore 9"), "#9 not a valid checkpoint\n");
    assert_eq!(run(&mut mon, &mut host, &out, "cond 9 if a == 1"), "#9 not a valid checkpoint\n");
    assert_eq!(run(&mut mon, &mut host, &out, "delete"), "Deleting all checkpoints\n");
    assert!(mon.checkpoints.is_empty());
}

#[test]
fn checkpoint_ids_are_decimal() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    for loc in 0..12 {
        run(&mut mon, &mut host, &out, &format!("break {loc:x}"));
    }
    run(&mut mon, &mut host, &out, "delete 10");
    assert!(mon.checkpoints.get(10).is_none());
    assert!(mon.checkpoints.get(0x10).is_none());
    assert_eq!(mon.checkpoints.len(), 11);
}

#[test]
fn errors_drop_rest_of_line() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    assert!(!mon.execute_line(&mut host, "break c000; break zz00; break c100"));
    assert_eq!(
        out.take(),
        "BREAK: 1  C:$c000  (Stop on exec)\n\
         ERROR -- Invalid register:\n  break c000; break zz00; break c100\n                    ^\n",
    );
    assert_eq!(mon.checkpoints.len(), 1);

    assert_eq!(
        run(&mut mon, &mut host, &out, "frob"),
        "ERROR -- Bad command:\n  frob\n  ^\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "break d000 c000"),
        "ERROR -- Bad second address in range:\n  break d000 c000\n             ^\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "break .nowhere"),
        "ERROR -- Found an undefined label:\n  break .nowhere\n        ^\n",
    );
    assert_eq!(mon.checkpoints.len(), 1);
}

#[test]
fn register_errors_point_at_register() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    assert_eq!(
        run(&mut mon, &mut host, &out, "z 2 + iy"),
        "ERROR -- Invalid register:\n  z 2 + iy\n        ^\n",
    );
    run(&mut mon, &mut host, &out, "break c000");
    assert_eq!(
        run(&mut mon, &mut host, &out, "ignore 1 ix"),
        "ERROR -- Invalid register:\n  ignore 1 ix\n           ^\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "r a = hl"),
        "ERROR -- Invalid register:\n  r a = hl\n        ^\n",
    );
    assert_eq!(mon.take_resume(), None);
}

#[test]
fn execution_control() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "z 3");
    assert_eq!(mon.take_resume(), Some(Resume::Step { count: 3, over: false }));
    run(&mut mon, &mut host, &out, "n");
    assert_eq!(mon.take_resume(), Some(Resume::Step { count: 1, over: true }));
    run(&mut mon, &mut host, &out, "g 1000");
    assert_eq!(mon.take_resume(), Some(Resume::Continue));
    assert_eq!(host.register(MemSpace::Computer, Reg::PC), Some(0x1000));
    run(&mut mon, &mut host, &out, "ret");
    assert_eq!(mon.take_resume(), Some(Resume::Return));
    assert_eq!(mon.take_resume(), None);
    assert_eq!(mon.prompt(&host), "(C:$1000) ");
}

#[test]
fn registers() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "r a = 10, x = ff");
    assert_eq!(host.register(MemSpace::Computer, Reg::A), Some(0x10));
    assert_eq!(host.register(MemSpace::Computer, Reg::X), Some(0xff));
    assert_eq!(
        run(&mut mon, &mut host, &out, "r"),
        "  PC   A  X  Y  SP FL\n.;c000 10 ff 00 00 00\n",
    );
    assert!(run(&mut mon, &mut host, &out, "r a = 100").starts_with("ERROR -- Immediate"));
}

#[test]
fn memory_commands() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "> 1000 1 2 3 4 \"hi!\"");
    assert_eq!(
        run(&mut mon, &mut host, &out, "m 1000 1006"),
        ">C:1000  01 02 03 04 68 69 21   ....hi!\n",
    );

    run(&mut mon, &mut host, &out, "t 1000 1003 1001");
    assert_eq!((0x1000..0x1005).map(|loc| host.byte(loc)).collect::<Vec<_>>(), [1, 1, 2, 3, 4]);

    run(&mut mon, &mut host, &out, "f 2000 2007 5 6 7");
    assert_eq!(
        (0x2000..0x2009).map(|loc| host.byte(loc)).collect::<Vec<_>>(),
        [5, 6, 7, 5, 6, 7, 5, 6, 0],
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "h 2000 2008 6 7"),
        "C:$2001\nC:$2004\n",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "c 2000 2002 2003"),
        "",
    );
    assert_eq!(
        run(&mut mon, &mut host, &out, "c 2000 2002 2001"),
        "$2000 $2001: 05 06\n$2001 $2002: 06 07\n$2002 $2003: 07 05\n",
    );
    assert!(run(&mut mon, &mut host, &out, "> 1000 100").starts_with("ERROR -- Immediate"));
}

#[test]
fn memory_side_effects() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "m 1000 100f");
    assert_eq!(host.reads, 0);
    assert_eq!(
        run(&mut mon, &mut host, &out, "sidefx on"),
        "I/O side effects are enabled\n",
    );
    run(&mut mon, &mut host, &out, "m 1000 100f");
    assert_eq!(host.reads, 16);
}

#[test]
fn memory_continues() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    run(&mut mon, &mut host, &out, "m 1000 101f");
    assert!(run(&mut mon, &mut host, &out, "m").starts_with(">C:1020 "));
}

#[test]
fn radix() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    assert_eq!(run(&mut mon, &mut host, &out, "radix d"), "Default radix is Decimal\n");
    assert_eq!(run(&mut mon, &mut host, &out, "p 10 + 5"), "15\n");
    assert_eq!(
        run(&mut mon, &mut host, &out, "break 49152"),
        "BREAK: 1  C:$c000  (Stop on exec)\n",
    );
    // Radix changes apply to the rest of the line.
    assert_eq!(run(&mut mon, &mut host, &out, "radix h; p 10"), "Default radix is Hexadecimal\n10\n");
    assert_eq!(run(&mut mon, &mut host, &out, "~ ff"), "$ff\n+255\n&377\n%11111111\n");
    assert_eq!(run(&mut mon, &mut host, &out, "p 1 - 2"), "-01\n");
    assert_eq!(run(&mut mon, &mut host, &out, "p $100000000"), "0000000100000000\n");
}

#[test]
fn labels() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    host.mem.get_mut(&MemSpace::Computer).unwrap()[0xc000] = 0xea;
    run(&mut mon, &mut host, &out, "al c000 .loop");
    run(&mut mon, &mut host, &out, ".data = 8:0300");
    assert_eq!(run(&mut mon, &mut host, &out, "p .loop + 1"), "c001\n");
    assert_eq!(run(&mut mon, &mut host, &out, "shl"), "C:$c000 .loop\n");
    assert_eq!(run(&mut mon, &mut host, &out, "shl 8:"), "8:$0300 .data\n");
    assert_eq!(
        run(&mut mon, &mut host, &out, "d .loop .loop"),
        ".loop:\n.C:c000  ea         NOP\n",
    );

    let path = temp_file("labels");
    let path = path.display();
    assert_eq!(
        run(&mut mon, &mut host, &out, &format!("sl \"{path}\"")),
        format!("Saved 2 labels to `{path}'\n"),
    );
    run(&mut mon, &mut host, &out, "cl");
    assert_eq!(mon.symbols.get(MemSpace::Computer, "loop"), None);
    assert_eq!(
        run(&mut mon, &mut host, &out, &format!("ll \"{path}\"")),
        format!("Loaded 2 labels from `{path}'\n"),
    );
    assert_eq!(mon.symbols.get(MemSpace::Computer, "loop"), Some(0xc000));
    assert_eq!(mon.symbols.get(MemSpace::Disk8, "data"), Some(0x0300));

    run(&mut mon, &mut host, &out, "dl .loop");
    assert_eq!(mon.symbols.get(MemSpace::Computer, "loop"), None);
    let _ = std::fs::remove_file(temp_file("labels"));
}

#[test]
fn save_and_load() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    let path = temp_file("prg");
    let path = path.display();
    run(&mut mon, &mut host, &out, "> 1000 a1 b2 c3");
    run(&mut mon, &mut host, &out, &format!("s \"{path}\" 1000 1002"));
    assert_eq!(std::fs::read(temp_file("prg")).unwrap(), [0x00, 0x10, 0xa1, 0xb2, 0xc3]);

    run(&mut mon, &mut host, &out, "f 1000 1002 0");
    assert_eq!(
        run(&mut mon, &mut host, &out, &format!("l \"{path}\"")),
        format!("Loading {path} from $1000 to $1002 (3 bytes)\n"),
    );
    assert_eq!(host.byte(0x1001), 0xb2);
    assert_eq!(
        run(&mut mon, &mut host, &out, &format!("v \"{path}\" 1000")),
        format!("Verify of `{path}' ok\n"),
    );

    run(&mut mon, &mut host, &out, &format!("bl \"{path}\" 2000"));
    assert_eq!(host.byte(0x2000), 0x00);
    assert_eq!(host.byte(0x2001), 0x10);
    assert_eq!(host.byte(0x2002), 0xa1);
    let _ = std::fs::remove_file(temp_file("prg"));
}

#[test]
fn record_and_playback() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    let path = temp_file("record");
    let path = path.display();
    run(&mut mon, &mut host, &out, &format!("record \"{path}\""));
    run(&mut mon, &mut host, &out, "break c000");
    run(&mut mon, &mut host, &out, "stop");
    assert_eq!(
        std::fs::read_to_string(temp_file("record")).unwrap(),
        "break c000\nstop\n",
    );

    run(&mut mon, &mut host, &out, "delete");
    run(&mut mon, &mut host, &out, &format!("pb \"{path}\""));
    assert_eq!(mon.checkpoints.len(), 1);
    let _ = std::fs::remove_file(temp_file("record"));
}

#[test]
fn nesting_is_limited() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    let path = temp_file("nested");
    let line = format!("playback \"{}\"", path.display());
    std::fs::write(&path, &line).unwrap();
    assert!(run(&mut mon, &mut host, &out, &line).contains("Commands nested too deep"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn help() {
    let (mut mon, out) = monitor();
    let mut host = FakeHost::default();
    let text = run(&mut mon, &mut host, &out, "help bk");
    assert!(text.starts_with("Syntax: break [load|store|exec]*"));
    assert!(text.contains("Abbreviation: bk"));
    assert_eq!(
        run(&mut mon, &mut host, &out, "help frob"),
        "Command `frob' does not exist.\n",
    );
}
