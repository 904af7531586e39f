// POS upload client
//
// Posts translated orders to the legacy point-of-sale endpoint. Failures are
// hard errors so the caller can keep the order visible for manual recovery.

use std::time::Duration;

use crate::fulfillment::error::FulfillmentError;
use crate::fulfillment::translator::SystemOrder;

#[derive(Clone)]
pub struct SystemUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl SystemUploader {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }

    /// Upload a translated order, treating any non-2xx response as failure
    ///
    /// The POS returns 200 with an HTML error page on some rejections, so the
    /// response body is captured into the error for the operator log.
    pub async fn upload(
        &self,
        order_id: i64,
        payload: &SystemOrder,
    ) -> Result<(), FulfillmentError> {
        tracing::info!(order_id, branch_id = %payload.branch_id, "Uploading order to POS");

        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(order_id, status = status.as_u16(), "POS upload rejected");
            return Err(FulfillmentError::Rejected {
                order_id,
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(order_id, "POS upload accepted");
        Ok(())
    }
}
