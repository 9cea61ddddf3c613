pub mod diversity;
pub mod planner;
