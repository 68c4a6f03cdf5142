//! ## "I/O Class" opcodes
//!
//! The port number is in the immediate latch.  IN and OUT share one
//! microstep: a port equal to [`STDOUT_PORT`] pushes the first source
//! register to the output, whichever opcode is executing, while a
//! port equal to [`STDIN_PORT`] pops the input into the destination
//! register, for IN only.  Any other combination is a no-op.
use tracing::{event, Level};

use base::prelude::*;

use crate::control::{ControlUnit, Outcome};
use crate::datapath::DataPath;

impl ControlUnit {
    /// Implements IN.  If the input buffer is empty the destination
    /// register is left alone and the machine stops.
    pub(crate) fn op_in(&mut self, dp: &mut DataPath) -> Outcome {
        self.port_transfer(Opcode::In, dp)
    }

    /// Implements OUT.
    pub(crate) fn op_out(&mut self, dp: &mut DataPath) -> Outcome {
        self.port_transfer(Opcode::Out, dp)
    }

    fn port_transfer(&mut self, opcode: Opcode, dp: &mut DataPath) -> Outcome {
        let port = dp.immediate();
        if port == STDOUT_PORT {
            let value = dp.read_src1();
            dp.push_output(value);
            return Outcome::Continue;
        }
        if port == STDIN_PORT && opcode == Opcode::In {
            return match dp.pop_input() {
                Ok(value) => {
                    dp.write_dest(value);
                    Outcome::Continue
                }
                Err(_) => Outcome::EndOfInput,
            };
        }
        event!(Level::WARN, "{opcode} on port {port} does nothing");
        Outcome::Continue
    }
}
