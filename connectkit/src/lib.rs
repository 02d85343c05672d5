//! Umbrella crate for shipping the wallet connect/authenticate session to
//! app shells. Re-exports everything from `connectkit-core` and links its
//! FFI scaffolding into one distributable library.

pub use connectkit_core::*;
