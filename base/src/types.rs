/// The contents of a register or of a data cell.
///
/// Register values, immediates, addresses and character codes all
/// share this one representation.
pub type Value = i64;

/// The port from which `IN` reads characters.
pub const STDIN_PORT: Value = 0;

/// The port to which `OUT` writes characters.
pub const STDOUT_PORT: Value = 1;

/// Number of general registers in the reference configuration of
/// the machine.  Register 0 always reads as zero.
pub const DEFAULT_REGISTER_COUNT: usize = 5;

/// The character which terminates the input stream.
pub const INPUT_SENTINEL: char = '\0';
