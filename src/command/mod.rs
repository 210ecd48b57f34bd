mod check;

pub use check::{conclude, run_check};
