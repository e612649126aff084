//! # Contracts
//!
//! Shared data model for the magsync workspace: sample streams, channels,
//! the time grid, merged tables, diagnostics and the engine configuration.
//! Every other crate depends on this one; it depends on no workspace crate.
//!
//! ## Time Model
//! - Wall-clock instants are held as integer microseconds since the Unix
//!   epoch (`Micros`), so grid arithmetic is exact
//! - Missing values are `f64::NAN`

mod channel;
mod error;
mod grid;
mod report;
mod stream;
mod sync_config;
mod table;

pub use channel::*;
pub use error::*;
pub use grid::*;
pub use report::*;
pub use stream::*;
pub use sync_config::*;
pub use table::*;
