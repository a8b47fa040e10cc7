pub mod conditional;
pub mod paged;

pub use conditional::{last_modified_layer, LastModified, NotModified, NOT_MODIFIED};
pub use paged::PagedResultSet;
