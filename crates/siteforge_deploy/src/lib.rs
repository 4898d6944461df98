//! # siteforge_deploy
//!
//! Hands an extracted file set to one of several external publishing
//! collaborators (version-control push, hosting deploy) and normalizes the
//! result into one common outcome shape. Each provider is an adapter
//! behind the [`Publisher`] capability trait; the dispatcher depends only
//! on the trait.

pub mod dispatcher;
pub mod error;
pub mod github;
pub mod publisher;
pub mod supabase;
pub mod vercel;

pub use dispatcher::{Dispatcher, PublishOutcome};
pub use error::{DeployError, DeployResult};
pub use github::GitHubPublisher;
pub use publisher::{AccountInfo, PublishedLocation, Publisher};
pub use supabase::SupabasePublisher;
pub use vercel::VercelPublisher;
