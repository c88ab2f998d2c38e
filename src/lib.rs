pub mod api;
pub mod bot;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod telegram;
pub mod validation;
pub mod watchlist;
pub mod web;

pub use error::{Error, Result};
