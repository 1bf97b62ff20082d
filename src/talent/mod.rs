//! Talent build parsing and validation module

mod allocation;
mod report;
mod validator;


pub use allocation::*;
pub use report::*;
pub use validator::*;
