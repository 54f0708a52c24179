use crate::error::RecordError;
use crate::record::CallRecordApi;
use async_trait::async_trait;
use callroom_core::{CallId, CallRecord, EndReport, Review};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpCallRecordClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpCallRecordClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, RecordError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, call_id: &CallId, suffix: &str) -> String {
        format!("{}/calls/{}{}", self.base_url, call_id, suffix)
    }

    async fn check(res: Response) -> Result<Response, RecordError> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        Err(RecordError::UnexpectedStatus { status, body })
    }

    async fn json<T: DeserializeOwned>(res: Response) -> Result<T, RecordError> {
        Ok(Self::check(res).await?.json::<T>().await?)
    }
}

#[async_trait]
impl CallRecordApi for HttpCallRecordClient {
    async fn get_call(&self, call_id: &CallId) -> Result<CallRecord, RecordError> {
        let res = self
            .http
            .get(self.url(call_id, ""))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::json(res).await
    }

    async fn mark_started(&self, call_id: &CallId) -> Result<(), RecordError> {
        let res = self
            .http
            .patch(self.url(call_id, "/start"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }

    async fn mark_ended(&self, call_id: &CallId, report: EndReport) -> Result<(), RecordError> {
        let res = self
            .http
            .patch(self.url(call_id, "/end"))
            .bearer_auth(&self.token)
            .json(&report)
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }

    async fn post_review(&self, call_id: &CallId, review: &Review) -> Result<(), RecordError> {
        let res = self
            .http
            .post(self.url(call_id, "/review"))
            .bearer_auth(&self.token)
            .json(review)
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }
}
