pub mod market;

pub use market::{PriceSample, TokenSnapshot};
