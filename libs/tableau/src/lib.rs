//! Client library for administering users of a Tableau site
//!
//! The crate signs in to a Tableau Server / Tableau Online site through the
//! XML REST API and manages the users of that site: lookup, listing,
//! creation, site role updates and removal.
//!
//! ```rust,no_run
//! use tableau::{ClientConfig, Credentials, HttpTransport, UserDirectory, auth};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(&ClientConfig::default())?;
//!     let credentials = Credentials::new("admin", "secret");
//!     let session = auth::sign_in(&transport, "https://tableau.example.com/api/3.19", &credentials).await?;
//!     let directory = UserDirectory::new(transport, session);
//!     let user = directory.update_user_site_role("jane.doe", "Explorer").await?;
//!     println!("{} ({}) - {}", user.username, user.id, user.role);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod bulk;
pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod pagination;
pub mod transport;

pub use bulk::BulkUpdateReport;
pub use config::ClientConfig;
pub use directory::{RoleChange, UserDirectory};
pub use error::{ErrorDetail, TableauError, TableauResult};
pub use models::{Credentials, RoleAssignment, Session, User};
pub use pagination::UserPages;
pub use transport::HttpTransport;
