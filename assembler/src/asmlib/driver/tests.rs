use super::*;

fn inst(opcode: Opcode, operands: &[Value], addr_type: Option<AddrType>) -> MemoryCell {
    MemoryCell::Instruction(
        Instruction::new(opcode, operands.to_vec(), addr_type).expect("valid test data"),
    )
}

fn assemble_ok(source: &str) -> Vec<MemoryCell> {
    match assemble(source) {
        Ok(memory) => memory,
        Err(e) => panic!("failed to assemble {source:?}: {e}"),
    }
}

#[test]
fn test_minimal_program() {
    assert_eq!(
        assemble_ok("section data:\nsection text:\n  HALT\n"),
        vec![inst(Opcode::Halt, &[], None)]
    );
}

#[test]
fn test_data_follows_code() {
    let source = r"
section data:
    first: 10, 20
    second: 30
section text:
    LW r1, second   ; 3 instructions precede the data
    LW r2, first
    HALT
";
    assert_eq!(
        assemble_ok(source),
        vec![
            inst(Opcode::Lw, &[1, 5], Some(AddrType::Immediate)),
            inst(Opcode::Lw, &[2, 3], Some(AddrType::Immediate)),
            inst(Opcode::Halt, &[], None),
            MemoryCell::Data(10),
            MemoryCell::Data(20),
            MemoryCell::Data(30),
        ]
    );
}

#[test]
fn test_forward_and_backward_code_labels() {
    let source = r"
section data:
section text:
    JMP end
top:
    IN r1, 0
    BEQ r1, r0, end
    JMP top
end:
    HALT
";
    assert_eq!(
        assemble_ok(source),
        vec![
            inst(Opcode::Jmp, &[4], None),
            inst(Opcode::In, &[1, 0], None),
            inst(Opcode::Beq, &[1, 0, 4], None),
            inst(Opcode::Jmp, &[1], None),
            inst(Opcode::Halt, &[], None),
        ]
    );
}

#[test]
fn test_string_literal_data() {
    let memory = assemble_ok("section data: msg: 'Hi!', 0 after: 7 section text: HALT");
    assert_eq!(
        memory,
        vec![
            inst(Opcode::Halt, &[], None),
            MemoryCell::Data(72),
            MemoryCell::Data(105),
            MemoryCell::Data(33),
            MemoryCell::Data(0),
            MemoryCell::Data(7),
        ]
    );
}

#[test]
fn test_string_literal_keeps_comma_and_space() {
    let memory = assemble_ok("section data: 'a, b' section text: HALT");
    assert_eq!(
        &memory[1..],
        &[
            MemoryCell::Data(97),
            MemoryCell::Data(44),
            MemoryCell::Data(32),
            MemoryCell::Data(98),
        ]
    );
}

#[test]
fn test_character_literal_as_immediate() {
    assert_eq!(
        assemble_ok("section data: section text: ADD r1, r0, 'A' HALT")[0],
        inst(Opcode::Add, &[1, 0, 65], Some(AddrType::Immediate))
    );
}

#[test]
fn test_register_operands_lose_their_prefix() {
    let memory = assemble_ok(
        "section data: section text: LW r1, [r2] SW [r3], r4 SW [r1], 65 SUB r2, r3, r4 HALT",
    );
    assert_eq!(
        memory,
        vec![
            inst(Opcode::Lw, &[1, 2], Some(AddrType::Indirect)),
            inst(Opcode::Sw, &[3, 4], Some(AddrType::Indirect)),
            inst(Opcode::Sw, &[1, 65], Some(AddrType::Immediate)),
            inst(Opcode::Sub, &[2, 3, 4], Some(AddrType::Direct)),
            inst(Opcode::Halt, &[], None),
        ]
    );
}

#[test]
fn test_sections_in_either_order() {
    let a = assemble_ok("section data: x: 5 section text: LW r1, x HALT");
    let b = assemble_ok("section text: LW r1, x HALT section data: x: 5");
    assert_eq!(a, b);
}

#[test]
fn test_negative_immediate() {
    assert_eq!(
        assemble_ok("section data: section text: ADD r1, r1, -1 HALT")[0],
        inst(Opcode::Add, &[1, 1, -1], Some(AddrType::Immediate))
    );
}

#[test]
fn test_unknown_instruction_is_named() {
    match assemble("section data: section text: ADD r1, r1, 1 PUSH r1 HALT") {
        Err(e @ AssemblerFailure::SyntaxError { .. }) => {
            assert_eq!(e.to_string(), "syntax error: unknown instruction: PUSH");
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_undefined_symbol() {
    match assemble("section data: section text: JMP nowhere") {
        Err(AssemblerFailure::SyntaxError {
            kind: SyntaxErrorKind::UndefinedSymbol,
            token,
        }) => assert_eq!(token, "nowhere"),
        other => panic!("expected an undefined symbol error, got {other:?}"),
    }
}

#[test]
fn test_missing_text_section() {
    assert!(matches!(
        assemble("section data: 1 2 3"),
        Err(AssemblerFailure::SyntaxError {
            kind: SyntaxErrorKind::MissingSection,
            ..
        })
    ));
}

#[test]
fn test_register_name_is_not_a_label() {
    match assemble("section data: r1: 9 section text: LW r2, r1 HALT") {
        Err(AssemblerFailure::SyntaxError {
            kind: SyntaxErrorKind::RegisterLabel,
            token,
        }) => assert_eq!(token, "r1"),
        other => panic!("expected a register label error, got {other:?}"),
    }
}

#[test]
fn test_branch_compares_registers_only() {
    match assemble("section data: section text: BEQ r1, 5, end end: HALT") {
        Err(e @ AssemblerFailure::SyntaxError { .. }) => {
            assert_eq!(e.to_string(), "syntax error: operand must be a register: 5");
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}
