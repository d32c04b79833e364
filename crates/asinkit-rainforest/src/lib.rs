pub mod client;
pub mod error;
pub mod failure;
pub mod normalize;
pub mod types;

pub use client::RainforestClient;
pub use error::RainforestError;
pub use failure::{classify_error, classify_response};
pub use normalize::normalize_product;
pub use types::{ProductResponse, RawDimensions, RawProduct, RawVariant, StoreResponse};
