//! # Integration Tests

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod header_chain;

#[cfg(test)]
mod sync_flow;
