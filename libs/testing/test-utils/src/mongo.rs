//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that starts a MongoDB container for testing.

use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let uri = mongo.uri();
/// // Hand `uri` to a MongoConfig / ConnectionManager
/// # }
/// ```
pub struct TestMongo {
    container: ContainerAsync<Mongo>,
    uri: String,
}

impl TestMongo {
    /// Create a new test MongoDB instance
    ///
    /// Uses the MongoDB 8 image; the URI points at the `test` database.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("8")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let uri = format!("mongodb://127.0.0.1:{}/test", host_port);

        tracing::info!(port = host_port, "Test MongoDB ready (mongo:8)");

        Self { container, uri }
    }

    /// Connection string for the container
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Stop the container while keeping the handle, to simulate a dropped server
    pub async fn stop(&self) {
        self.container
            .stop()
            .await
            .expect("Failed to stop MongoDB container");
    }
}

// Container is automatically cleaned up when TestMongo is dropped
impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}
