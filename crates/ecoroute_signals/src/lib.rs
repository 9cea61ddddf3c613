pub mod elevation;
pub mod reading;
pub mod traffic;
pub mod weather;
