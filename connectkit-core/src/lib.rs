#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Core implementation of the wallet connect/authenticate flow.
//!
//! The host page injects its wallet provider reference and session store,
//! forwards page events to a [`WalletSession`] and applies the returned
//! [`HostEffect`]s. All sequencing decisions live in the pure
//! [`Sequencer`] state machine so the whole flow is testable without a
//! browser.

mod deep_link;
pub use deep_link::*;

mod environment;
pub use environment::*;

mod error;
pub use error::*;

pub mod logger;
pub use logger::*;

mod provider;
pub use provider::*;

mod sequencer;
pub use sequencer::*;

mod session;
pub use session::*;

mod store;
pub use store::*;

mod ui;
pub use ui::*;

uniffi::setup_scaffolding!("connectkit_core");
