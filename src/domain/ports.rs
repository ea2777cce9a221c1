use crate::domain::model::StressPlan;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Raw, unvalidated run parameters. `StressPlan::from_config` turns them
/// into a plan.
pub trait ConfigProvider: Send + Sync {
    fn url(&self) -> &str;
    fn method(&self) -> &str;
    fn total_requests(&self) -> usize;
    fn concurrency(&self) -> usize;
    fn interval_seconds(&self) -> i64;
    fn body(&self) -> &str;
    fn headers(&self) -> Vec<(String, String)>;
    fn timeout_seconds(&self) -> Option<u64>;
}

#[async_trait]
pub trait RequestSender: Send + Sync {
    /// Performs one request and returns the response status code.
    async fn send(&self, plan: &StressPlan) -> Result<u16>;
}
