//! citegraph: resolve citing papers' bibliographies against a canonical corpus and
//! accumulate the resolved citation graph, with run statistics, in a sled store.

pub mod bibliography;
pub mod cli;
pub mod commands;
pub mod common;
pub mod contexts;
pub mod corpus;
pub mod dataset;
pub mod extract;
pub mod intent;
pub mod resolve;
pub mod stats;
pub mod store;
