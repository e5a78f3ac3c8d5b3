pub mod errors;
pub mod db;
pub mod slug;
pub mod validate;
pub mod user;
pub mod user_credentials;
pub mod store;
pub mod billboard;
pub mod category;
pub mod subcategory;
pub mod color;
pub mod size;
pub mod product;
pub mod product_color;
pub mod product_size;
pub mod service_offering;
pub mod image;
pub mod news;
pub mod order;
pub mod order_item;

#[cfg(test)]
mod tests;
