pub mod classifier;
#[cfg(feature = "npz")]
pub mod dataset;
pub mod error;
#[cfg(feature = "render")]
pub mod render;

pub mod prelude {
    pub use crate::classifier::*;

    pub use crate::error::*;
}
