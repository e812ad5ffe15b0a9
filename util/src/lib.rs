pub mod config;
pub mod state;
pub mod test_helpers;
