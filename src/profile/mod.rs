//! Character profile field validation and text cleanup
//!
//! Each validator is an independent, stateless check; the bot composes
//! them per field of a character submission.

mod fields;
mod sanitize;


pub use fields::*;
pub use sanitize::*;
