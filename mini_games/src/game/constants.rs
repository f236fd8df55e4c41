/// Number of chambers in the revolver.
pub const CHAMBERS: usize = 6;

/// Rolls each player gets in a dice battle.
pub const DICE_ROLLS: u8 = 3;
pub const DIE_FACES: u32 = 6;

/// Inclusive range for the secret number.
pub const GUESS_MIN: i64 = 1;
pub const GUESS_MAX: i64 = 100;

pub const BOARD_CELLS: usize = 9;

/// Inclusive range for quick math operands.
pub const OPERAND_MIN: i64 = 1;
pub const OPERAND_MAX: i64 = 20;

/// Correct answers needed to win quick math.
pub const MATH_TARGET_SCORE: u8 = 3;

/// Seconds a session may live before it's discarded.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
