pub mod controller;
pub mod link_service;
pub mod verification;

pub use controller::{AppController, StartupOptions};
pub use link_service::{Completed, LinkService, PendingResolve, RejectedConfig, Resolution};
pub use verification::VerificationTask;
