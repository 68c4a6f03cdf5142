use test_strategy::proptest;

use base::prelude::*;

use super::timing::instruction_ticks;
use super::{ControlUnit, Outcome, Phase};
use crate::alarm::{Alarm, BadMemOp};
use crate::datapath::DataPath;
use crate::io::IoUnit;
use crate::memory::MemoryOpFailure;

fn inst(opcode: Opcode, operands: &[Value], addr_type: Option<AddrType>) -> MemoryCell {
    MemoryCell::Instruction(
        Instruction::new(opcode, operands.to_vec(), addr_type).expect("valid test data"),
    )
}

fn halt() -> MemoryCell {
    inst(Opcode::Halt, &[], None)
}

/// Build a datapath holding `program` with the given register
/// values (starting at r1) and input text.
fn setup(program: Vec<MemoryCell>, registers: &[Value], input: &str) -> (ControlUnit, DataPath) {
    let mut dp = DataPath::new(program, IoUnit::from_text(input), DEFAULT_REGISTER_COUNT);
    for (i, value) in registers.iter().enumerate() {
        dp.registers_mut()
            .set(i + 1, *value)
            .expect("test register should exist");
    }
    (ControlUnit::new(), dp)
}

fn step(control: &mut ControlUnit, dp: &mut DataPath) -> Outcome {
    match control.decode_and_execute(dp) {
        Ok(outcome) => outcome,
        Err(e) => panic!("unexpected alarm: {e}"),
    }
}

fn reg(dp: &DataPath, index: usize) -> Value {
    dp.registers().get(index).expect("test register should exist")
}

#[test]
fn test_add_registers() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Add, &[1, 2, 3], Some(AddrType::Direct)), halt()],
        &[0, 7, 5],
        "",
    );
    assert_eq!(step(&mut control, &mut dp), Outcome::Continue);
    assert_eq!(reg(&dp, 1), 12);
    assert_eq!(control.ticks(), 3);
    assert_eq!(control.instructions(), 1);
    assert_eq!(dp.instruction_pointer(), 1);
    assert_eq!(control.phase(), Phase::Fetching);
}

#[test]
fn test_add_immediate() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Add, &[2, 1, -4], Some(AddrType::Immediate))],
        &[10],
        "",
    );
    step(&mut control, &mut dp);
    assert_eq!(reg(&dp, 2), 6);
}

#[test]
fn test_div_and_rem_truncate() {
    let (mut control, mut dp) = setup(
        vec![
            inst(Opcode::Div, &[1, 2, 3], Some(AddrType::Direct)),
            inst(Opcode::Rem, &[4, 2, 3], Some(AddrType::Direct)),
        ],
        &[0, 7, 2],
        "",
    );
    step(&mut control, &mut dp);
    step(&mut control, &mut dp);
    assert_eq!(reg(&dp, 1), 3);
    assert_eq!(reg(&dp, 4), 1);
    assert_eq!(control.ticks(), 6);
}

#[test]
fn test_divide_by_zero_is_an_alarm() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Div, &[1, 2, 0], Some(AddrType::Immediate))],
        &[0, 7],
        "",
    );
    assert_eq!(
        control.decode_and_execute(&mut dp),
        Err(Alarm::DivideByZero { dividend: 7 })
    );
    assert_eq!(reg(&dp, 1), 0);
}

#[test]
fn test_load_indirect() {
    let mut program = vec![inst(Opcode::Lw, &[1, 2], Some(AddrType::Indirect))];
    program.resize(10, halt());
    program.push(MemoryCell::Data(42));
    let (mut control, mut dp) = setup(program, &[0, 10], "");
    step(&mut control, &mut dp);
    assert_eq!(reg(&dp, 1), 42);
    assert_eq!(control.ticks(), 3);
}

#[test]
fn test_load_immediate_address() {
    let (mut control, mut dp) = setup(
        vec![
            inst(Opcode::Lw, &[3, 2], Some(AddrType::Immediate)),
            halt(),
            MemoryCell::Data(-9),
        ],
        &[],
        "",
    );
    step(&mut control, &mut dp);
    assert_eq!(reg(&dp, 3), -9);
}

#[test]
fn test_load_from_instruction_cell() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Lw, &[1, 0], Some(AddrType::Immediate))],
        &[],
        "",
    );
    assert_eq!(
        control.decode_and_execute(&mut dp),
        Err(Alarm::Memory {
            op: BadMemOp::Read(0),
            failure: MemoryOpFailure::NotData(0),
        })
    );
}

#[test]
fn test_store_register_and_immediate() {
    let (mut control, mut dp) = setup(
        vec![
            inst(Opcode::Sw, &[1, 2], Some(AddrType::Indirect)),
            inst(Opcode::Sw, &[3, 65], Some(AddrType::Immediate)),
            MemoryCell::Data(0),
            MemoryCell::Data(0),
        ],
        &[2, 17, 3],
        "",
    );
    step(&mut control, &mut dp);
    assert_eq!(control.ticks(), 2);
    step(&mut control, &mut dp);
    assert_eq!(control.ticks(), 4);
    assert_eq!(dp.memory().read(2), Ok(17));
    assert_eq!(dp.memory().read(3), Ok(65));
}

#[test]
fn test_store_out_of_range() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Sw, &[1, 2], Some(AddrType::Indirect))],
        &[100],
        "",
    );
    assert!(matches!(
        control.decode_and_execute(&mut dp),
        Err(Alarm::Memory {
            op: BadMemOp::Write(100),
            failure: MemoryOpFailure::NotMapped { .. },
        })
    ));
}

#[test]
fn test_out_then_halt() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Out, &[1, STDOUT_PORT], None), halt()],
        &[72],
        "",
    );
    assert_eq!(step(&mut control, &mut dp), Outcome::Continue);
    assert_eq!(step(&mut control, &mut dp), Outcome::Halted);
    assert_eq!(dp.io().output_text(), "H");
    assert_eq!(control.ticks(), 3);
    assert_eq!(control.instructions(), 2);
    assert_eq!(control.phase(), Phase::Halted);
}

#[test]
fn test_in_reads_input_then_sentinel() {
    let (mut control, mut dp) = setup(
        vec![
            inst(Opcode::In, &[1, STDIN_PORT], None),
            inst(Opcode::In, &[2, STDIN_PORT], None),
        ],
        &[],
        "x",
    );
    step(&mut control, &mut dp);
    step(&mut control, &mut dp);
    assert_eq!(reg(&dp, 1), Value::from(b'x'));
    assert_eq!(reg(&dp, 2), 0);
    assert_eq!(control.ticks(), 4);
}

#[test]
fn test_in_at_end_of_input() {
    let (mut control, mut dp) = setup(vec![inst(Opcode::In, &[1, STDIN_PORT], None)], &[33], "");
    // Consume the sentinel so that the buffer is empty.
    dp.pop_input().expect("input holds the sentinel");
    assert_eq!(step(&mut control, &mut dp), Outcome::EndOfInput);
    assert_eq!(reg(&dp, 1), 33);
    assert_eq!(control.ticks(), 1);
    assert_eq!(control.instructions(), 1);
}

#[test]
fn test_port_decides_io_direction() {
    // OUT on the input port and any opcode on an unknown port do
    // nothing.  Port 1 outputs the first source register even for
    // IN, and IN doesn't reselect it.
    let (mut control, mut dp) = setup(
        vec![
            inst(Opcode::Out, &[1, STDIN_PORT], None),
            inst(Opcode::Out, &[1, 7], None),
            inst(Opcode::In, &[2, 7], None),
            inst(Opcode::Out, &[1, STDOUT_PORT], None),
            inst(Opcode::In, &[2, STDOUT_PORT], None),
        ],
        &[72],
        "z",
    );
    for _ in 0..5 {
        assert_eq!(step(&mut control, &mut dp), Outcome::Continue);
    }
    assert_eq!(dp.io().output_text(), "HH");
    assert_eq!(reg(&dp, 1), 72);
    assert_eq!(reg(&dp, 2), 0);
    assert_eq!(dp.io().input_remaining(), 2);
    assert_eq!(control.ticks(), 10);
}

#[test]
fn test_jump() {
    let (mut control, mut dp) = setup(vec![inst(Opcode::Jmp, &[5], None)], &[], "");
    step(&mut control, &mut dp);
    assert_eq!(dp.instruction_pointer(), 5);
    assert_eq!(control.ticks(), 2);
}

#[test]
fn test_branches() {
    // (opcode, left, right, taken)
    let cases = [
        (Opcode::Beq, 3, 3, true),
        (Opcode::Beq, 3, 4, false),
        (Opcode::Bne, 3, 4, true),
        (Opcode::Bne, 4, 4, false),
        (Opcode::Blt, -1, 0, true),
        (Opcode::Blt, 0, 0, false),
        (Opcode::Bgt, 1, 0, true),
        (Opcode::Bgt, 0, 0, false),
        (Opcode::Bnl, 0, 0, true),
        (Opcode::Bnl, -5, 0, false),
        (Opcode::Bng, 0, 0, true),
        (Opcode::Bng, 2, 0, false),
    ];
    for (opcode, left, right, taken) in cases {
        let (mut control, mut dp) = setup(
            vec![inst(opcode, &[1, 2, 9], None)],
            &[left, right],
            "",
        );
        step(&mut control, &mut dp);
        let expected_ip = if taken { 9 } else { 1 };
        assert_eq!(
            dp.instruction_pointer(),
            expected_ip,
            "{opcode} with {left} and {right}"
        );
        assert_eq!(control.ticks(), 3, "{opcode} should take 3 ticks");
    }
}

#[test]
fn test_fetch_data_is_an_alarm() {
    let (mut control, mut dp) = setup(vec![MemoryCell::Data(1)], &[], "");
    assert_eq!(
        control.decode_and_execute(&mut dp),
        Err(Alarm::Memory {
            op: BadMemOp::Fetch(0),
            failure: MemoryOpFailure::NotInstruction(0),
        })
    );
    assert_eq!(control.instructions(), 0);
}

#[test]
fn test_missing_register() {
    let (mut control, mut dp) = setup(
        vec![inst(Opcode::Add, &[1, 9, 0], Some(AddrType::Immediate))],
        &[],
        "",
    );
    assert_eq!(
        control.decode_and_execute(&mut dp),
        Err(Alarm::BadRegister { index: 9, count: 5 })
    );
}

fn arith_opcode(n: u8) -> Opcode {
    [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Rem,
    ][usize::from(n % 5)]
}

#[proptest]
fn register_zero_is_invariant(op_choice: u8, left: Value, right: Value, load_first: bool) {
    let opcode = arith_opcode(op_choice);
    let right = if right == 0 { 1 } else { right };
    let mut program = Vec::new();
    if load_first {
        program.push(inst(Opcode::Lw, &[0, 4], Some(AddrType::Immediate)));
    }
    program.push(inst(opcode, &[0, 1, 2], Some(AddrType::Direct)));
    program.push(halt());
    program.push(MemoryCell::Data(left));
    program.push(MemoryCell::Data(right));
    let (mut control, mut dp) = setup(program, &[left, right], "");
    loop {
        match control.decode_and_execute(&mut dp) {
            Ok(Outcome::Continue) => (),
            Ok(_) => break,
            Err(e) => panic!("unexpected alarm: {e}"),
        }
    }
    assert_eq!(reg(&dp, 0), 0);
}

#[proptest]
fn ticks_do_not_depend_on_operands(op_choice: u8, left: Value, right: Value) {
    let opcode = arith_opcode(op_choice);
    let right = if right == 0 { -1 } else { right };
    let (mut control, mut dp) = setup(
        vec![inst(opcode, &[3, 1, 2], Some(AddrType::Direct))],
        &[left, right],
        "",
    );
    step(&mut control, &mut dp);
    assert_eq!(control.ticks(), instruction_ticks(opcode));
}
