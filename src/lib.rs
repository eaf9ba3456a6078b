#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod configuration;
pub mod domain;
pub mod error;
#[macro_use]
mod macros;
pub mod middleware;
pub mod report;
pub mod routes;
pub mod startup;
pub mod telemetry;
