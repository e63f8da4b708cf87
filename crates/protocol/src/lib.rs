//! Boundary protocol for canvas scenes
//!
//! Defines the request and response messages for building a scene,
//! the wire form of element specs, and the stable error codes.

pub mod elements;
pub mod error;
pub mod messages;

pub use elements::*;
pub use error::ProtocolError;
pub use messages::*;
