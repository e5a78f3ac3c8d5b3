//! Business operations per catalog resource. Every mutation takes the acting
//! user and checks store ownership after validating its input.

pub mod store_service;
pub mod billboard_service;
pub mod category_service;
pub mod subcategory_service;
pub mod color_service;
pub mod size_service;
pub mod product_service;
pub mod offering_service;
pub mod news_service;
pub mod order_service;
