//! Process exit conventions.
//!
//! 0: success (nothing to do, or everything rewritten cleanly)
//! 1: `check` found files that would change
//! 2: tool error (bad config, unreadable input, invalid arguments)

pub const SUCCESS: i32 = 0;
pub const CHANGES_NEEDED: i32 = 1;
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    pub fn success() -> ! {
        std::process::exit(super::SUCCESS)
    }

    pub fn changes_needed() -> ! {
        std::process::exit(super::CHANGES_NEEDED)
    }

    pub fn tool_error() -> ! {
        std::process::exit(super::TOOL_ERROR)
    }
}
