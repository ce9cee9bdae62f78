pub mod prelude;

pub mod customers;
pub mod product_slides;
pub mod products;
pub mod ratings;
pub mod stored_files;
