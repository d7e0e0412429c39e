//! Rust client for the Netmera content API
//!
//! Low-level layer of the Netmera SDK: configuration, error codes, the HTTP
//! transport seam and the request dispatcher. Records, queries and users live
//! in `netmera-sdk`.
//!
//! # Example
//!
//! ```rust,no_run
//! use netmera_client::{ClientConfig, Dispatcher, FormRequest, SearchEnvelope};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::with_api_key("my-api-key");
//! let dispatcher = Dispatcher::new(config)?;
//!
//! let response: SearchEnvelope = dispatcher
//!     .send_as(
//!         FormRequest::post("/content/search", "my-api-key")
//!             .param("path", "/mobimeracontents")
//!             .param("max", 10)
//!             .param("page", 0),
//!     )
//!     .await?;
//! println!("{} results", response.total_results);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod transport;
pub mod types;

// Re-export main types
pub use config::{BackendProfile, ClientConfig};
pub use dispatcher::{is_falsy, Dispatcher, FormRequest, RpcRequest};
pub use error::{ErrorCode, NetmeraError, Result};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
pub use types::*;
