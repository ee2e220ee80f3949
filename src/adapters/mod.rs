pub mod config_store;
pub mod link_verifier;
pub mod output_manager;

pub use config_store::TomlConfigStore;
pub use link_verifier::HttpLinkVerifier;
pub use output_manager::ClipboardOutputManager;
