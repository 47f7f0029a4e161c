//! Ambient plumbing shared across the workspace: process-wide logging
//! setup and the `RANDSEED`-driven random number source (spec.md §6).

mod logger;
mod rand;

pub use logger::setup_logger;
pub use rand::{rand, rand_reseed};
