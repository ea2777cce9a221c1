use crate::domain::model::StressPlan;
use crate::domain::ports::RequestSender;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Sends plan requests over a shared reqwest connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpSender {
    client: Client,
}

impl HttpSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl RequestSender for HttpSender {
    async fn send(&self, plan: &StressPlan) -> Result<u16> {
        let mut request = self.client.request(plan.method.into(), &plan.url);

        for (name, value) in &plan.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if plan.has_body() {
            request = request.body(plan.body.clone());
        }
        if let Some(timeout) = plan.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        // the response counts as complete once its body has been read
        let body = response.bytes().await?;
        tracing::trace!("{} {} -> {} ({} bytes)", plan.method, plan.url, status, body.len());

        Ok(status)
    }
}
