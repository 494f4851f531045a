pub mod common;
pub mod payment;
