mod common;
mod features;
#[cfg(test)]
mod testing;

pub mod app;
pub mod config;
pub mod data_model;
pub mod logging;
pub mod presentation;
pub mod probe;
pub mod roster;
pub mod runtime;
pub mod settings;
pub mod storage;

pub use common::{date, time};
pub use features::{aggregate, country, provider, range, resolver, series};
