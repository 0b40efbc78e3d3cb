pub mod derive;
pub mod model;

pub use derive::{check_derived, derive, parse_price, validate_quotes};
pub use model::{DerivedPrices, Divisor, Origin, PriceObservation, SourcePrices};
