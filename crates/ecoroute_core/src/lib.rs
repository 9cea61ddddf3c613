pub mod candidate;
pub mod cost;
pub mod engine;
pub mod environment;
pub mod geopoint;
pub mod ranker;
pub mod signature;
