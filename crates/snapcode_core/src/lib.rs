pub mod asset;
pub mod error;
pub mod gallery;
pub mod identity;
pub mod traits;

pub mod prelude {
    pub use super::asset::*;
    pub use super::error::*;
    pub use super::gallery::*;
    pub use super::identity::*;
    pub use super::traits::*;
}
