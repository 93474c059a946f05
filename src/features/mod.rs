pub mod aggregate;
pub mod country;
pub mod provider;
pub mod range;
pub mod resolver;
pub mod series;
