//! Netmera SDK
//!
//! Typed records, queries and user accounts on top of `netmera-client`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use netmera_sdk::{GeoLocation, NetmeraClient};
//!
//! # async fn example() -> netmera_sdk::Result<()> {
//! let client = NetmeraClient::init("my-api-key")?;
//!
//! let mut cafe = client.content("Places");
//! cafe.add("name", "Corner Cafe")?;
//! cafe.add("location", GeoLocation::new(41.04, 29.0))?;
//! cafe.create().await?;
//!
//! let places = client
//!     .service("Places")
//!     .circle_search(GeoLocation::new(41.0, 29.0), 10.0, "location")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod action_token;
pub mod client;
pub mod condition;
pub mod content;
pub mod geo;
pub mod service;
pub mod session;
pub mod user;

#[cfg(test)]
mod test_support;

pub use action_token::{ActionScope, ActionTokenGate};
pub use client::NetmeraClient;
pub use condition::{Clause, CompareOp, ConditionBuilder, Pattern};
pub use content::{FieldValue, NetmeraContent};
pub use geo::GeoLocation;
pub use service::{NetmeraService, SortOrder};
pub use session::{Session, UserProfile};
pub use user::NetmeraUser;

// Re-export the client layer
pub use netmera_client::{BackendProfile, ClientConfig, ErrorCode, NetmeraError, Result, Transport};
