use thiserror::Error;

/// Errors from translating and uploading orders to the point-of-sale system
#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("POS upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("POS rejected order {order_id}: status {status}, body: {body}")]
    Rejected {
        order_id: i64,
        status: u16,
        body: String,
    },
}
