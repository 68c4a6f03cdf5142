//! ## "Branch Class" opcodes
//!
//! - JMP: [`ControlUnit::op_jmp`]
//! - BEQ, BNE, BLT, BGT, BNL, BNG: [`ControlUnit::op_branch`]
use base::prelude::*;

use crate::alarm::Alarm;
use crate::control::{ControlUnit, Outcome};
use crate::datapath::DataPath;

impl ControlUnit {
    /// Implements the JMP opcode.  The target is already in the
    /// immediate latch.
    pub(crate) fn op_jmp(&mut self, dp: &mut DataPath) -> Outcome {
        dp.write_program_counter();
        Outcome::Continue
    }

    /// Implements the conditional branches.  The comparator takes one
    /// tick; the branch then either loads the instruction pointer
    /// from the immediate latch or leaves it pointing at the next
    /// instruction.
    pub(crate) fn op_branch(&mut self, opcode: Opcode, dp: &mut DataPath) -> Result<Outcome, Alarm> {
        let Some(condition) = opcode.branch_condition() else {
            return Err(Alarm::Bug(format!(
                "op_branch was called for {opcode}, which is not a conditional branch"
            )));
        };
        let (left, right) = (dp.read_src1(), dp.read_src2());
        let comparator = dp.comparator_mut();
        comparator.load(left, right);
        let (equals, less_than) = comparator.compare();
        self.tick(dp);
        if condition.is_taken(equals, less_than) {
            dp.write_program_counter();
        }
        Ok(Outcome::Continue)
    }
}
