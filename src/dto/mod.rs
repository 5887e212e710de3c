pub mod cart;
pub mod favorites;
pub mod orders;
