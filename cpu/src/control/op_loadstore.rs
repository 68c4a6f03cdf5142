//! Implementations of "Memory Class" opcodes
//! - LW: [`ControlUnit::op_lw`]
//! - SW: [`ControlUnit::op_sw`]

use crate::alarm::Alarm;
use crate::control::{ControlUnit, Outcome};
use crate::datapath::DataPath;

impl ControlUnit {
    /// Implements LW.  The address comes from the immediate latch
    /// when the instruction is immediate-addressed, and from the
    /// first source register otherwise.
    pub(crate) fn op_lw(&mut self, immediate: bool, dp: &mut DataPath) -> Result<Outcome, Alarm> {
        let address = if immediate {
            dp.immediate()
        } else {
            dp.read_src1()
        };
        let value = dp.read_cell(address)?;
        self.tick(dp);
        dp.write_dest(value);
        Ok(Outcome::Continue)
    }

    /// Implements SW.  The address is always in the first source
    /// register; the stored value is either the second source
    /// register or the immediate.
    pub(crate) fn op_sw(&mut self, immediate: bool, dp: &mut DataPath) -> Result<Outcome, Alarm> {
        let address = dp.read_src1();
        let value = if immediate {
            dp.immediate()
        } else {
            dp.read_src2()
        };
        dp.write_cell(address, value)?;
        Ok(Outcome::Continue)
    }
}
