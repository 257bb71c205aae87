//! # Application Layer
//!
//! Network pipeline assembly and the header acceptor.

pub mod acceptor;
pub mod networks;

pub use acceptor::HeaderAcceptor;
pub use networks::{build_validator, difficulty_chain};
