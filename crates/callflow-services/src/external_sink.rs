//! Remote batch webhook sink
//!
//! Delivers the full list of derived external records for one run as a
//! single POST. The batch is atomic from the pipeline's perspective: there
//! is no mechanism to retry part of a failed batch, so a failed delivery
//! fails the run and the admin trigger must be re-issued.

use callflow_core::{
    models::ExternalCdrRecord,
    traits::ExternalCdrSink,
    AppError, AppResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// HTTP implementation of the external CDR sink
pub struct HttpExternalCdrSink {
    client: reqwest::Client,
    upload_url: String,
}

/// Receiver acknowledgment shape
#[derive(Debug, Deserialize)]
struct DeliveryAck {
    status: String,
    received: u64,
}

impl HttpExternalCdrSink {
    /// Create a sink posting to the given URL
    pub fn new(client: reqwest::Client, upload_url: impl Into<String>) -> Self {
        Self {
            client,
            upload_url: upload_url.into(),
        }
    }
}

#[async_trait]
impl ExternalCdrSink for HttpExternalCdrSink {
    async fn deliver_batch(&self, records: &[ExternalCdrRecord]) -> AppResult<u64> {
        debug!(
            "Delivering external CDR batch of {} records to {}",
            records.len(),
            self.upload_url
        );

        let response = self
            .client
            .post(&self.upload_url)
            .json(records)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("external CDR POST failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Delivery(format!(
                "external CDR receiver returned HTTP {}",
                status
            )));
        }

        let ack: DeliveryAck = response.json().await.map_err(|e| {
            AppError::Delivery(format!("external CDR receiver sent unexpected ack: {}", e))
        })?;

        if ack.status != "OK" {
            return Err(AppError::Delivery(format!(
                "external CDR receiver rejected batch: status {}",
                ack.status
            )));
        }

        if ack.received != records.len() as u64 {
            warn!(
                "External CDR receiver acknowledged {} of {} records",
                ack.received,
                records.len()
            );
        }

        info!("Delivered external CDR batch: {} records", ack.received);

        Ok(ack.received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_deserialization() {
        let ack: DeliveryAck =
            serde_json::from_str(r#"{"status": "OK", "received": 3}"#).unwrap();
        assert_eq!(ack.status, "OK");
        assert_eq!(ack.received, 3);
    }

    #[test]
    fn test_batch_serializes_as_json_array() {
        let records = vec![ExternalCdrRecord {
            call_id: "200".to_string(),
            call_start: "2024-06-18T13:00:00Z".parse().unwrap(),
            call_end: "2024-06-18T13:05:40Z".parse().unwrap(),
            caller_number: "+19998887766".to_string(),
            operator_id: "300".to_string(),
            operator_name: "Charlie".to_string(),
            agent_status: "ANSWERED".to_string(),
            wait_sec: Some(10),
            talk_sec: Some(330),
            end_reason: "COMPLETED".to_string(),
        }];

        let json = serde_json::to_value(&records).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["call_id"], "200");
    }
}
