pub mod config;
pub mod error;
pub mod locator;
pub mod runner;
pub mod schema;
pub mod validator;
pub mod yaml;
