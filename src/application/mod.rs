//! Application layer orchestrating the checkout journey.
//!
//! `CheckoutFlow` is the entry point. It drives the `CheckoutInitiator`, hands the
//! session to the redirect dispatcher and, once the shopper returns, runs the
//! `SessionVerifier`. The dispatcher and the verifier are plain state machines;
//! their async drivers only add tokio timers, so both can be tested on a paused
//! clock.

pub mod flow;
pub mod initiator;
pub mod redirect;
pub mod state;
pub mod verifier;
