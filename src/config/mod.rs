mod flags;
pub mod loader;
mod types;

pub use flags::{add_flags, block_profile_rate, debug_address, BLOCK_PROFILE_RATE_FLAG, DEBUG_FLAG};
pub use types::*;
