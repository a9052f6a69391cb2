//! Builder-style factories for seeding queue state. Every test gets a
//! fresh in-memory database, so there is no find-or-create dance; each
//! builder just inserts what it was told to.

use async_trait::async_trait;
use shotqueue::models::{
    Browser, Factory, NewBrowser, NewFactory, NewRequest, NewRequestGroup, Request, RequestGroup,
};
use sqlx::SqlitePool;

use super::harness::T0;

pub type FactoryResult<T> = anyhow::Result<T>;

/// Minimal builder contract shared by the fixtures below.
#[async_trait]
pub trait SqliteFactory<T> {
    async fn create(&self, pool: &SqlitePool) -> FactoryResult<T>;
}

/// Builds a request group; requests are added with [`RequestFactory`].
#[derive(Debug, Clone)]
pub struct RequestGroupFactory {
    website: String,
    submitted: i64,
    grace_secs: i64,
}

impl Default for RequestGroupFactory {
    fn default() -> Self {
        Self {
            website: "http://www.example.com/".to_string(),
            submitted: T0,
            grace_secs: 1800,
        }
    }
}

impl RequestGroupFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = website.to_string();
        self
    }

    pub fn submitted_at(mut self, submitted: i64) -> Self {
        self.submitted = submitted;
        self
    }

    pub fn with_grace(mut self, grace_secs: i64) -> Self {
        self.grace_secs = grace_secs;
        self
    }
}

#[async_trait]
impl SqliteFactory<RequestGroup> for RequestGroupFactory {
    async fn create(&self, pool: &SqlitePool) -> FactoryResult<RequestGroup> {
        let group = RequestGroup::create(
            pool,
            NewRequestGroup {
                website: self.website.clone(),
            },
            self.submitted,
            self.grace_secs,
        )
        .await?;
        Ok(group)
    }
}

/// Builds one pending request inside an existing group.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    new_request: NewRequest,
    created: i64,
}

impl RequestFactory {
    pub fn new(request_group_id: i64, platform_id: i64, browser_group_id: i64) -> Self {
        Self {
            new_request: NewRequest::basic(request_group_id, platform_id, browser_group_id),
            created: T0,
        }
    }

    pub fn with_major(mut self, major: i64) -> Self {
        self.new_request.major = Some(major);
        self
    }

    pub fn with_minor(mut self, minor: i64) -> Self {
        self.new_request.minor = Some(minor);
        self
    }

    pub fn with_bpp(mut self, bpp: i64) -> Self {
        self.new_request.bpp = Some(bpp);
        self
    }

    pub fn with_flags(mut self, js: bool, java: bool, flash: bool, media: bool) -> Self {
        self.new_request.js = js;
        self.new_request.java = java;
        self.new_request.flash = flash;
        self.new_request.media = media;
        self
    }

    pub fn created_at(mut self, created: i64) -> Self {
        self.created = created;
        self
    }
}

#[async_trait]
impl SqliteFactory<Request> for RequestFactory {
    async fn create(&self, pool: &SqlitePool) -> FactoryResult<Request> {
        let request = Request::create(pool, self.new_request.clone(), self.created).await?;
        Ok(request)
    }
}

/// Spec for one browser installed by [`FactoryFixture`].
#[derive(Debug, Clone)]
struct BrowserSpec {
    browser_group_id: i64,
    major: i64,
    minor: i64,
    uploads_per_hour: Option<i64>,
    uploads_per_day: Option<i64>,
}

/// A factory together with the browsers it was provisioned with.
#[derive(Debug, Clone)]
pub struct ProvisionedFactory {
    pub factory: Factory,
    pub browsers: Vec<Browser>,
}

/// Builds a factory, optionally stamps a poll, and installs browsers.
#[derive(Debug, Clone)]
pub struct FactoryFixture {
    name: String,
    admin: String,
    platform_id: i64,
    polled_at: Option<i64>,
    queue_estimate: Option<i64>,
    browsers: Vec<BrowserSpec>,
}

impl FactoryFixture {
    pub fn new(name: &str, platform_id: i64) -> Self {
        Self {
            name: name.to_string(),
            admin: "ops".to_string(),
            platform_id,
            polled_at: None,
            queue_estimate: None,
            browsers: Vec::new(),
        }
    }

    pub fn with_admin(mut self, admin: &str) -> Self {
        self.admin = admin.to_string();
        self
    }

    /// Stamp a poll at the given instant, making the factory active
    /// relative to times within the liveness window after it.
    pub fn polled_at(mut self, at: i64) -> Self {
        self.polled_at = Some(at);
        self
    }

    pub fn with_queue_estimate(mut self, seconds: i64) -> Self {
        self.queue_estimate = Some(seconds);
        self
    }

    pub fn with_browser(mut self, browser_group_id: i64, major: i64, minor: i64) -> Self {
        self.browsers.push(BrowserSpec {
            browser_group_id,
            major,
            minor,
            uploads_per_hour: None,
            uploads_per_day: None,
        });
        self
    }

    pub fn with_limited_browser(
        mut self,
        browser_group_id: i64,
        major: i64,
        minor: i64,
        uploads_per_hour: i64,
        uploads_per_day: i64,
    ) -> Self {
        self.browsers.push(BrowserSpec {
            browser_group_id,
            major,
            minor,
            uploads_per_hour: Some(uploads_per_hour),
            uploads_per_day: Some(uploads_per_day),
        });
        self
    }
}

#[async_trait]
impl SqliteFactory<ProvisionedFactory> for FactoryFixture {
    async fn create(&self, pool: &SqlitePool) -> FactoryResult<ProvisionedFactory> {
        let created_at = self.polled_at.unwrap_or(T0);
        let factory = Factory::create(
            pool,
            NewFactory {
                name: self.name.clone(),
                admin: self.admin.clone(),
                platform_id: self.platform_id,
            },
            created_at,
        )
        .await?;

        if let Some(at) = self.polled_at {
            Factory::record_poll(pool, factory.factory_id, at, self.queue_estimate).await?;
        }

        let mut browsers = Vec::new();
        for spec in &self.browsers {
            let browser = Browser::create(
                pool,
                NewBrowser {
                    factory_id: factory.factory_id,
                    browser_group_id: spec.browser_group_id,
                    major: spec.major,
                    minor: spec.minor,
                    uploads_per_hour: spec.uploads_per_hour,
                    uploads_per_day: spec.uploads_per_day,
                },
                created_at,
            )
            .await?;
            browsers.push(browser);
        }

        // Re-read so the returned factory carries the poll stamp.
        let factory = Factory::find_by_id(pool, factory.factory_id)
            .await?
            .expect("factory just created");

        Ok(ProvisionedFactory { factory, browsers })
    }
}
