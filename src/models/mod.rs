pub mod browser;
pub mod browser_group;
pub mod factory;
pub mod failure;
pub mod lease;
pub mod platform;
pub mod request;
pub mod request_group;

// Re-export core models for easy access
pub use browser::{ActiveBrowser, Browser, NewBrowser};
pub use browser_group::BrowserGroup;
pub use factory::{Factory, NewFactory};
pub use failure::FailureRecord;
pub use lease::Lease;
pub use platform::Platform;
pub use request::{NewRequest, Request, WebsiteRequest};
pub use request_group::{NewRequestGroup, RequestGroup};
