mod annotation;
mod layout;
mod page;

pub use annotation::annotation;
pub use layout::{base, PageConfig, PAGE_SCRIPT, PAGE_STYLESHEET};
pub use page::map_page;
