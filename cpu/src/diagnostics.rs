//! Diagnostic information for log messages and alarms.
use std::fmt::{self, Display, Formatter};

use base::prelude::*;

/// CurrentInstructionDiagnostics is only for generating debug
/// information.  It must not be used for control/execution
/// purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentInstructionDiagnostics {
    pub current_instruction: Instruction,
    pub instruction_address: Value,
}

impl Display for CurrentInstructionDiagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "instruction {} at address {}",
            self.current_instruction, self.instruction_address
        )
    }
}

#[test]
fn test_diagnostics_display() {
    let diagnostics = CurrentInstructionDiagnostics {
        current_instruction: Instruction::new(Opcode::Jmp, vec![12], None)
            .expect("valid test data"),
        instruction_address: 3,
    };
    assert_eq!(diagnostics.to_string(), "instruction JMP 12 at address 3");
}
