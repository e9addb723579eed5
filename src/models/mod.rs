//! Domain models for LeadTrack.
//!
//! # Core Concepts
//!
//! - [`Lead`]: A prospective customer moving through the sales pipeline.
//!   The aggregate root everything else points at.
//! - [`EmailTemplate`]: Reusable email text with `{{placeholder}}` markers.
//! - [`EmailLog`]: Immutable record of an email sent to a lead.
//! - [`Meeting`]: A scheduled meeting with a lead.
//! - [`FollowUp`]: A reminder to do something for a lead at a given time.
//!
//! All entities serialize with camelCase field names and snake_case enum
//! values. This is the wire format shared by the REST API, the MCP tools
//! and the JSON file backend, so the serde attributes here are load-bearing.

mod email;
mod follow_up;
mod lead;
mod meeting;
mod template;

pub use email::*;
pub use follow_up::*;
pub use lead::*;
pub use meeting::*;
pub use template::*;
