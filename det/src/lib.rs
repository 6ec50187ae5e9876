//! Determinants, the diagonal cache and the configuration-space contract.

pub mod det;
pub mod diag;
pub mod error;
pub mod hubbard;
pub mod system;


pub use det::{Det, HalfDet};
pub use diag::DiagHelper;
pub use error::SystemError;
pub use hubbard::{HubbardParams, HubbardSystem, Lattice};
pub use system::{System, SystemData};
