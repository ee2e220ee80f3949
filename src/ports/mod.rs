pub mod config;
pub mod output;
pub mod verifier;

pub use config::ConfigStore;
pub use output::OutputManager;
pub use verifier::LinkVerifier;
