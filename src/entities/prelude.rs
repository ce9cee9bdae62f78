pub use super::customers::Entity as Customers;
pub use super::product_slides::Entity as ProductSlides;
pub use super::products::Entity as Products;
pub use super::ratings::Entity as Ratings;
pub use super::stored_files::Entity as StoredFiles;
