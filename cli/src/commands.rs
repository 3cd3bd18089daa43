pub mod fetch;
pub mod inspect;
pub mod render;
pub mod summary;
