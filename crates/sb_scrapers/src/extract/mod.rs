//! HTML to `ExtractedContent` conversion, independent of how the page was fetched.

pub mod rendered;
pub mod static_page;

pub use rendered::{extract_rendered, find_main_container, resolve_image_src, ContainerChoice};
pub use static_page::{extract_static, NOT_EXTRACTED_PLACEHOLDER};
