//! Configuration module

mod site;

pub use site::normalize_base;
pub use site::HighlightConfig;
pub use site::Project;
pub use site::SiteConfig;
pub use site::Stars;
