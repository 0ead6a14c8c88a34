pub mod ai;
pub mod analytics;
pub mod auth;
pub mod customers;
pub mod messages;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shops;
