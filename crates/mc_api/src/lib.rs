mod client;
mod error;
pub mod types;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
