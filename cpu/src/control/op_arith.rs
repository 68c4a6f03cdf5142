//! ## "Arithmetic Class" opcodes
//!
//! ADD, SUB, MUL, DIV and REM all go through
//! [`ControlUnit::op_arith`]; they differ only in the ALU operation.
use base::prelude::*;

use crate::alarm::Alarm;
use crate::control::{ControlUnit, Outcome};
use crate::datapath::DataPath;

impl ControlUnit {
    pub(crate) fn op_arith(
        &mut self,
        opcode: Opcode,
        immediate: bool,
        dp: &mut DataPath,
    ) -> Result<Outcome, Alarm> {
        let Some(op) = opcode.arith_op() else {
            return Err(Alarm::Bug(format!(
                "op_arith was called for {opcode}, which is not an arithmetic opcode"
            )));
        };
        let left = dp.read_src1();
        let right = if immediate {
            dp.immediate()
        } else {
            dp.read_src2()
        };
        let alu = dp.alu_mut();
        alu.load(left, right);
        let result = alu.compute(op)?;
        self.tick(dp);
        dp.write_dest(result);
        Ok(Outcome::Continue)
    }
}
