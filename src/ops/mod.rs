pub mod color_removal;
pub mod export;
pub mod transform;
