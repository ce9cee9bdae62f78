pub mod customers;
pub mod health;
pub mod ratings;
pub mod slides;
