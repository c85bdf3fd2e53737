//! Integration tests for the callflow API layer
//!
//! These exercise the DTO conversions and response shapes the handlers
//! produce. Full end-to-end coverage against live sources and a database
//! lives in the pipeline's own test suite.

use callflow_api::dto::{ApiResponse, CdrResponse, CdrStatsResponse, PaginationParams, TriggerResponse};
use callflow_core::models::Cdr;
use callflow_core::traits::{CdrSummary, ResultCount};
use callflow_services::SinkKind;
use uuid::Uuid;

fn sample_cdr() -> Cdr {
    Cdr {
        call_id: "100".to_string(),
        call_start: "2024-06-18T12:00:00Z".parse().unwrap(),
        call_end: "2024-06-18T12:05:00Z".parse().unwrap(),
        caller_number: "+79991112233".to_string(),
        callee_number: "54321".to_string(),
        duration_sec: 300,
        call_result: "COMPLETED".to_string(),
        call_events: vec!["hangup".to_string(), "start".to_string()],
    }
}

#[test]
fn test_cdr_response_preserves_text_call_id() {
    let response = CdrResponse::from(sample_cdr());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["call_id"], "100");
    assert_eq!(json["duration_sec"], 300);
    assert_eq!(json["call_result"], "COMPLETED");
}

#[test]
fn test_stats_response_conversion() {
    let summary = CdrSummary {
        total_cdrs: 10,
        total_duration_sec: 3000,
        avg_duration_sec: 300,
        by_result: vec![
            ResultCount {
                call_result: "COMPLETED".to_string(),
                count: 8,
            },
            ResultCount {
                call_result: "NO_ANSWER".to_string(),
                count: 2,
            },
        ],
    };

    let response = CdrStatsResponse::from(summary);
    assert_eq!(response.total_cdrs, 10);
    assert_eq!(response.avg_duration_sec, 300);
    assert_eq!(response.by_result.len(), 2);
}

#[test]
fn test_trigger_response_reports_sink_kind() {
    let response = TriggerResponse {
        run_id: Uuid::nil(),
        sink: SinkKind::Internal,
        calls_seen: 2,
        eligible_calls: 1,
        records_delivered: 1,
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["sink"], "internal");
    assert_eq!(json["eligible_calls"], 1);
}

#[test]
fn test_api_response_wrapper_shape() {
    let wrapped = ApiResponse::with_message(
        CdrResponse::from(sample_cdr()),
        "internal CDR upload completed",
    );

    let json = serde_json::to_value(&wrapped).unwrap();
    assert_eq!(json["data"]["call_id"], "100");
    assert_eq!(json["message"], "internal CDR upload completed");
}

#[test]
fn test_pagination_defaults() {
    let params: PaginationParams = serde_json::from_str("{}").unwrap();
    assert_eq!(params.page, 1);
    assert_eq!(params.per_page, 50);
}
