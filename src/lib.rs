pub mod catalog;
pub mod config;
mod constants;
pub mod convert;
pub mod error;
pub mod extract;
mod khaload;
pub use khaload::{Backend, load_config, run};
pub mod load;
pub mod pipeline;
pub mod transform;

#[cfg(test)]
mod test_suite;
