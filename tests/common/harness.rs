//! Shared test harness: a fresh in-memory queue per test plus the
//! catalog seed most scenarios start from.

use shotqueue::config::QueueConfig;
use shotqueue::database::Database;
use shotqueue::dispatch::{LeaseManager, RequestMatcher};
use shotqueue::models::{Browser, BrowserGroup, Factory, Platform};
use shotqueue::services::{Overview, PollService, QueueEstimator};
use sqlx::SqlitePool;

use super::factories::{FactoryFixture, SqliteFactory};

/// Fixed "now" used across the tests. Windows are exercised by placing
/// rows before or after this instant, never by sleeping.
pub const T0: i64 = 1_700_000_000;

/// One in-memory queue, schema applied, with its configuration.
pub struct TestQueue {
    pub database: Database,
    pub config: QueueConfig,
}

impl TestQueue {
    pub async fn new() -> Self {
        Self::with_config(QueueConfig::default()).await
    }

    pub async fn with_config(config: QueueConfig) -> Self {
        shotqueue::init_logging();
        let database = Database::in_memory().await.expect("in-memory database");
        Self { database, config }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.database.pool()
    }

    pub fn matcher(&self) -> RequestMatcher {
        RequestMatcher::new(self.pool().clone(), self.config.clone())
    }

    pub fn leases(&self) -> LeaseManager {
        LeaseManager::new(self.pool().clone(), self.config.clone())
    }

    pub fn polls(&self) -> PollService {
        PollService::new(self.pool().clone(), self.config.clone())
    }

    pub fn estimator(&self) -> QueueEstimator {
        QueueEstimator::new(self.pool().clone(), self.config.clone())
    }

    pub fn overview(&self) -> Overview {
        Overview::new(self.pool().clone(), self.config.clone())
    }
}

/// Catalog most tests start from: Linux, Firefox, and one factory that
/// polled at [`T0`] offering Firefox 3.5 with a 120s backlog.
pub struct SeededCatalog {
    pub platform: Platform,
    pub browser_group: BrowserGroup,
    pub factory: Factory,
    pub browser: Browser,
}

pub async fn seed_linux_firefox(queue: &TestQueue) -> SeededCatalog {
    let pool = queue.pool();
    let platform = Platform::create(pool, "Linux").await.expect("platform");
    let browser_group = BrowserGroup::create(pool, "Firefox")
        .await
        .expect("browser group");

    let provisioned = FactoryFixture::new("ubuntu-jaunty", platform.platform_id)
        .polled_at(T0)
        .with_queue_estimate(120)
        .with_browser(browser_group.browser_group_id, 3, 5)
        .create(pool)
        .await
        .expect("seed factory");

    SeededCatalog {
        platform,
        browser_group,
        factory: provisioned.factory,
        browser: provisioned
            .browsers
            .into_iter()
            .next()
            .expect("seed factory has one browser"),
    }
}
