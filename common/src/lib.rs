//! Ratefeed Common Types
//!
//! Shared types used across the Ratefeed workspace: symbols and the
//! configured symbol universe, USD-based rate mappings, and the payload
//! served to clients.

pub mod symbol;
pub mod rates;
pub mod error;
pub mod time;

pub use symbol::*;
pub use rates::*;
pub use error::*;
pub use time::*;
