//! Configuration module

mod site;

pub use site::ConfigError;
pub use site::DefaultsScope;
pub use site::FrontMatterDefaults;
pub use site::IdentityMode;
pub use site::SiteConfig;
