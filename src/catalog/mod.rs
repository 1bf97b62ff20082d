//! Static game data: talent trees and roster enumerations

mod roster;
mod store;
mod talents;

pub use roster::*;
pub use store::*;
pub use talents::*;

#[cfg(test)]
pub(crate) use talents::fixtures;
