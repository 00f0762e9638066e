pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

/// Exit status used for every user-input error (the argparse convention).
pub const ERROR_EXIT_CODE: i32 = 2;

// Dest of the argument a branching parser uses to select its sub-command.
pub(crate) const BRANCH_DEST: &str = "_command_";
