//! Static bundling of simple web projects for local preview.

mod simple_web;

pub use simple_web::{DEFAULT_ENTRYPOINT, NO_HTML_PLACEHOLDER, build};
