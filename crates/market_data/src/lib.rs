pub mod error;
pub mod fallback;
pub mod remote;
pub mod traits;

pub use error::ProviderError;
pub use traits::{PriceProvider, SentimentProvider};
