pub mod cart;
pub mod notice;
pub mod ports;
pub mod session;
pub mod verification;
