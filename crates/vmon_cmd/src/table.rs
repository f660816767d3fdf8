/// Name, abbreviation and help text of a command.
pub struct CommandInfo {
    pub name: &'static str,
    pub abbrev: Option<&'static str>,
    pub params: &'static str,
    pub desc: &'static str,
}

macro_rules! command {
    ($name:literal, $abbrev:expr, $params:literal, $desc:literal) => {
        CommandInfo { name: $name, abbrev: $abbrev, params: $params, desc: $desc }
    };
}

pub const COMMANDS: &[CommandInfo] = &[
    command!("step", Some("z"), "[<count>]",
        "Single step the next <count> instructions, following subroutine calls."),
    command!("next", Some("n"), "[<count>]",
        "Step the next <count> instructions, treating a subroutine call as one instruction."),
    command!("return", Some("ret"), "",
        "Run until the current subroutine returns."),
    command!("goto", Some("g"), "[<address>]",
        "Leave the monitor and continue at <address>, or at the current PC."),
    command!("exit", Some("x"), "",
        "Leave the monitor and continue execution."),
    command!("quit", None, "",
        "Quit the emulator."),
    command!("backtrace", Some("bt"), "",
        "Print the subroutine return addresses found on the stack."),
    command!("registers", Some("r"), "[<reg> = <value> [, <reg> = <value>]*]",
        "Show the registers, or assign values to them."),
    command!("cpu", None, "[<type>]",
        "Show or set the processor model used for the default memspace."),
    command!("bank", None, "[<name>]",
        "Show the available banks, or select the bank used by memory and disassembly listings."),

    command!("add_label", Some("al"), "<address> <.label>",
        "Map <.label> to <address>."),
    command!("delete_label", Some("dl"), "<.label>",
        "Remove <.label> from the symbol table."),
    command!("show_labels", Some("shl"), "[<memspace>]",
        "List the labels of <memspace>, or of all memspaces."),
    command!("clear_labels", Some("cl"), "[<memspace>]",
        "Remove the labels of <memspace>, or of all memspaces."),
    command!("save_labels", Some("sl"), "[<memspace>] \"<filename>\"",
        "Save the labels to a file."),
    command!("load_labels", Some("ll"), "[<memspace>] \"<filename>\"",
        "Load labels from a file written by save_labels."),

    command!("a", None, "<address> [<instruction>]",
        "Assemble <instruction> at <address>."),
    command!("disass", Some("d"), "[<address> [<address>]]",
        "Disassemble instructions, continuing after the last listing if no address is given."),

    command!("mem", Some("m"), "[<address range>]",
        "Display memory as hex and text."),
    command!("i", None, "[<address range>]",
        "Display memory as text."),
    command!("fill", Some("f"), "<address range> <data list>",
        "Fill the range with the repeated data list."),
    command!("move", Some("t"), "<address range> <destination>",
        "Move memory from the range to <destination>."),
    command!("compare", Some("c"), "<address range> <address>",
        "Compare the range with memory at <address> and print the differences."),
    command!("hunt", Some("h"), "<address range> <data list>",
        "Print the addresses inside the range where the data list is found."),
    command!(">", None, "<address> <data list>",
        "Write the data list to memory at <address>."),
    command!("load", Some("l"), "\"<filename>\" [<address>]",
        "Load a file with a two byte load address header into memory."),
    command!("bload", Some("bl"), "\"<filename>\" <address>",
        "Load a raw file into memory at <address>."),
    command!("save", Some("s"), "\"<filename>\" <address range>",
        "Save memory to a file with a two byte load address header."),
    command!("bsave", Some("bs"), "\"<filename>\" <address range>",
        "Save memory to a raw file."),
    command!("verify", Some("v"), "\"<filename>\" <address>",
        "Compare a raw file with memory at <address>."),

    command!("break", Some("bk"), "[load|store|exec]* [<address range> [if <cond>]]",
        "Stop when the range is accessed. Defaults to exec. Lists the checkpoints without arguments."),
    command!("watch", Some("w"), "[load|store|exec]* [<address range> [if <cond>]]",
        "Stop when the range is accessed. Defaults to load and store."),
    command!("trace", Some("tr"), "[load|store|exec]* [<address range> [if <cond>]]",
        "Report accesses to the range without stopping. Defaults to load and store."),
    command!("until", Some("un"), "[<address>]",
        "Leave the monitor and stop once <address> is executed."),
    command!("condition", Some("cond"), "<checknum> if <cond>",
        "Only trigger checkpoint <checknum> when <cond> holds."),
    command!("command", Some("cmd"), "<checknum> \"<command>\"",
        "Execute <command> each time checkpoint <checknum> triggers."),
    command!("enable", Some("en"), "[<checknum>|all]",
        "Enable checkpoint <checknum>, or all checkpoints."),
    command!("disable", Some("dis"), "[<checknum>|all]",
        "Disable checkpoint <checknum>, or all checkpoints."),
    command!("ignore", None, "<checknum> [<count>]",
        "Ignore the next <count> hits of checkpoint <checknum>."),
    command!("delete", Some("del"), "[<checknum>]",
        "Delete checkpoint <checknum>, or all checkpoints."),

    command!("radix", Some("rad"), "[h|d|o|b]",
        "Show or set the default radix."),
    command!("device", Some("dev"), "[c:|8:|9:|10:|11:]",
        "Show or set the default memspace."),
    command!("sidefx", Some("sfx"), "[on|off|toggle]",
        "Show or set whether memory reads of the monitor cause I/O side effects."),

    command!("print", Some("p"), "<expression>",
        "Evaluate and print an expression."),
    command!("~", None, "<number>",
        "Print a number in all radixes."),
    command!("help", Some("?"), "[<command>]",
        "Show the command list, or the help text of <command>."),
    command!("@", None, "<disk command>",
        "Send a command to the disk drive of the default device."),
    command!("cd", None, "\"<directory>\"",
        "Change the working directory."),
    command!("pwd", None, "",
        "Print the working directory."),
    command!("dir", None, "[\"<directory>\"]",
        "List a directory."),
    command!("record", Some("rec"), "\"<filename>\"",
        "Record all following commands to a file."),
    command!("stop", None, "",
        "Stop recording commands."),
    command!("playback", Some("pb"), "\"<filename>\"",
        "Execute the commands in a file."),
];

/// Find a command by name or abbreviation, ignoring case.
pub fn find_command(word: &str) -> Option<&'static CommandInfo> {
    COMMANDS.iter().find(|info| {
        info.name.eq_ignore_ascii_case(word)
            || info.abbrev.map_or(false, |abbrev| abbrev.eq_ignore_ascii_case(word))
    })
}

#[test]
fn unique_names() {
    for (i, info) in COMMANDS.iter().enumerate() {
        for other in &COMMANDS[i + 1..] {
            assert_ne!(info.name, other.name);
            if let Some(abbrev) = info.abbrev {
                assert_ne!(Some(abbrev), other.abbrev);
                assert_ne!(abbrev, other.name);
            }
        }
    }
}

#[test]
fn lookup() {
    assert_eq!(find_command("BK").map(|info| info.name), Some("break"));
    assert_eq!(find_command("disass").map(|info| info.name), Some("disass"));
    assert!(find_command("frobnicate").is_none());
}
