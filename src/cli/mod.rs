pub mod image;
pub mod inspect;
pub mod list;
pub mod sync;
