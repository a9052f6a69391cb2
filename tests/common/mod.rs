#![allow(dead_code)] // each test binary uses its own slice of the helpers

pub mod factories;
pub mod harness;

pub use factories::*;
pub use harness::*;
