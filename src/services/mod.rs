pub mod customer_service;
pub mod file_store;
pub mod pagination;
pub mod rating_service;
pub mod slide_service;
pub mod storage;
