mod candle;
mod credentials;
mod price_sample;
mod ticker;

pub use candle::{Candle, CandleInterval};
pub use credentials::Credentials;
pub use price_sample::{Direction, PriceSample};
pub use ticker::Ticker;
