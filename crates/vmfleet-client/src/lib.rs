//! vmfleet-client: management API client library
//!
//! Talks to an oVirt/RHEV-style REST API that exchanges XML documents over
//! HTTP Basic authentication.
//!
//! # Example
//!
//! ```no_run
//! use vmfleet_client::{Credentials, HttpClient, RemoteApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = Credentials::new("admin@internal", "secret");
//! let client = HttpClient::new("https://manager.example.com/api/vms/", creds)?;
//!
//! // Query one VM
//! let vm = client.fetch("101").await?;
//! println!("state: {}", vm.text("vm.status.state"));
//!
//! // Start it
//! let action = client.post_action("101", "start").await?;
//! println!("action: {}", action.text("action.status.state"));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod http;
pub mod traits;

pub use document::{Document, Node};
pub use error::{ClientError, DocumentError, Result};
pub use http::{HttpClient, HttpClientBuilder};
pub use traits::{Credentials, RemoteApi};
