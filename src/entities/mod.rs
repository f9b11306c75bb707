pub mod admin;
pub mod product;
pub mod product_category;
pub mod product_media;
pub mod product_size;
