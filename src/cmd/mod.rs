pub mod bucket;
pub mod filters;
pub mod input;
pub mod list;
pub mod replay;
