use arch::{Segment, VmCommand};
use hackvm::CodeWriter;

/// Translates, assembles and runs VM sources on the emulated machine.
fn run_program(sources: &[(&str, &str)], bootstrap: bool, steps: usize) -> hackemu::Machine {
    let mut writer = CodeWriter::new(Vec::new());
    if bootstrap {
        writer.write_bootstrap().unwrap();
    }
    for (file, text) in sources {
        hackvm::translate(&mut writer, file, text).unwrap();
    }
    let asm = String::from_utf8(writer.into_inner()).unwrap();

    let commands = hackasm::parse("generated.asm", &asm).unwrap();
    let words = hackasm::assemble(&commands).unwrap();

    let mut machine = hackemu::Machine::new(words);
    if !bootstrap {
        machine.ram[0] = hackvm::STACK_BASE as i16;
    }
    machine.run(steps);
    machine
}

/// VM text that leaves `value` on the stack. Constants only carry 0..=32767,
/// so negative values go through `neg`/`not`.
fn push_value(value: i16) -> String {
    match value {
        i16::MIN => "push constant 32767\nnot\n".to_string(),
        v if v < 0 => format!("push constant {}\nneg\n", -(v as i32)),
        v => format!("push constant {v}\n"),
    }
}

#[test]
fn stack_arithmetic() {
    let machine = run_program(&[("Main", "push constant 7\npush constant 8\nadd\n")], false, 200);
    assert_eq!(machine.ram[0], 257);
    assert_eq!(machine.ram[256], 15);

    let machine = run_program(&[("Main", "push constant 3\npush constant 10\nsub\n")], false, 200);
    assert_eq!(machine.ram[256], -7);

    let machine = run_program(
        &[("Main", "push constant 12\npush constant 10\nand\npush constant 1\nor\n")],
        false,
        200,
    );
    assert_eq!(machine.ram[256], 9);

    let machine = run_program(&[("Main", "push constant 3\nshiftleft\nshiftleft\n")], false, 200);
    assert_eq!(machine.ram[256], 12);

    let machine = run_program(&[("Main", "push constant 0\nnot\n")], false, 200);
    assert_eq!(machine.ram[256], -1);
}

fn compare_case(op: &str, x: i16, y: i16, expect: bool) {
    let src = format!("{}{}{op}\n", push_value(x), push_value(y));
    let machine = run_program(&[("Main", &src)], false, 1000);
    let got = machine.ram[256];
    assert_eq!(
        got,
        if expect { -1 } else { 0 },
        "{x} {op} {y}"
    );
    assert_eq!(machine.ram[0], 257, "stack height after {x} {op} {y}");
}

#[test]
fn comparisons_match_exact_arithmetic_at_extremes() {
    // Opposite signs at full magnitude overflow a naive subtraction; the
    // sign-branching translation must still answer correctly.
    let pairs: &[(i16, i16)] = &[
        (i16::MAX, i16::MIN),
        (i16::MIN, i16::MAX),
        (i16::MAX, i16::MAX),
        (i16::MIN, i16::MIN),
        (i16::MAX, 1),
        (-1, i16::MAX),
        (1, -1),
        (-1, 1),
        (0, 0),
        (0, -1),
        (5, 3),
        (3, 5),
        (-3, -5),
        (-5, -3),
    ];
    for &(x, y) in pairs {
        compare_case("gt", x, y, x > y);
        compare_case("lt", x, y, x < y);
        compare_case("eq", x, y, x == y);
    }
}

#[test]
fn call_and_return_restore_the_caller_frame() {
    let sys = "\
function Sys.init 0
push constant 21
call Main.double 1
pop temp 1
label HALT
goto HALT
";
    let main = "\
function Main.double 1
push argument 0
push argument 0
add
pop local 0
push local 0
return
";
    let machine = run_program(&[("Sys", sys), ("Main", main)], true, 20_000);

    assert_eq!(machine.ram[6], 42); // temp 1
    // Sys.init's view of the world is exactly as before the call.
    assert_eq!(machine.ram[0], 261); // SP: bootstrap frame + one temp pop
    assert_eq!(machine.ram[1], 261); // LCL
    assert_eq!(machine.ram[2], 256); // ARG
    assert_eq!(machine.ram[3], 0); // THIS
    assert_eq!(machine.ram[4], 0); // THAT
}

#[test]
fn recursive_calls_unwind_symmetrically() {
    let sys = "\
function Sys.init 0
push constant 5
call Main.sum 1
pop temp 2
label HALT
goto HALT
";
    let main = "\
function Main.sum 0
push argument 0
if-goto RECURSE
push constant 0
return
label RECURSE
push argument 0
push argument 0
push constant 1
sub
call Main.sum 1
add
return
";
    let machine = run_program(&[("Sys", sys), ("Main", main)], true, 50_000);

    assert_eq!(machine.ram[7], 15); // 5+4+3+2+1
    assert_eq!(machine.ram[0], 261);
    assert_eq!(machine.ram[1], 261);
    assert_eq!(machine.ram[2], 256);
}

#[test]
fn statics_are_namespaced_per_file() {
    let alpha = "push constant 11\npop static 0\n";
    let beta = "push constant 22\npop static 0\npush static 0\n";
    let machine = run_program(&[("Alpha", alpha), ("Beta", beta)], false, 500);

    // Distinct cells in first-seen order from the variable base.
    assert_eq!(machine.ram[16], 11); // Alpha.0
    assert_eq!(machine.ram[17], 22); // Beta.0
    assert_eq!(machine.ram[256], 22);
}

#[test]
fn branching_commands_loop_and_exit() {
    let src = "\
push constant 3
pop temp 0
label LOOP
push temp 0
if-goto BODY
goto DONE
label BODY
push temp 0
push constant 1
sub
pop temp 0
goto LOOP
label DONE
push constant 1
pop temp 4
";
    let machine = run_program(&[("Main", src)], false, 2000);
    assert_eq!(machine.ram[5], 0); // temp 0 counted down
    assert_eq!(machine.ram[9], 1); // temp 4 set after exit
    assert_eq!(machine.ram[0], 256);
}

#[test]
fn pointer_and_that_segments_alias_memory() {
    // Point THAT at 3000 via pointer 1, store through that 0.
    let src = "\
push constant 3000
pop pointer 1
push constant 77
pop that 0
push that 0
";
    let machine = run_program(&[("Main", src)], false, 500);
    assert_eq!(machine.ram[4], 3000);
    assert_eq!(machine.ram[3000], 77);
    assert_eq!(machine.ram[256], 77);
}

#[test]
fn invalid_emissions_are_rejected() {
    let mut writer = CodeWriter::new(Vec::new());
    assert!(matches!(
        writer.write(&VmCommand::Pop(Segment::Constant, 0)),
        Err(hackvm::Error::PopConstant)
    ));
    assert!(matches!(
        writer.write(&VmCommand::Pop(Segment::Temp, 8)),
        Err(hackvm::Error::SegmentRange(Segment::Temp, 8))
    ));
    assert!(matches!(
        writer.write(&VmCommand::Push(Segment::Pointer, 2)),
        Err(hackvm::Error::SegmentRange(Segment::Pointer, 2))
    ));
}

#[test]
fn push_expands_to_the_canonical_sequence() {
    let mut writer = CodeWriter::new(Vec::new());
    writer.write(&VmCommand::Push(Segment::Constant, 7)).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(
        text,
        "// push constant 7\n@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n"
    );
}
