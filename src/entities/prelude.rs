pub use super::payments::Entity as Payments;
