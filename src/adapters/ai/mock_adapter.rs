//! Mock text generator for running without API calls.
//!
//! Echoes the skeleton found in the request payload back with canned guidance,
//! so the full pipeline can run offline.

use crate::domain::DomainError;
use crate::ports::{CompletionRequest, TextGenerationPort};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

/// Mock generator. Simulates network latency with a configurable delay.
pub struct MockAiAdapter {
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    fn guidance(session_type: &str) -> (&'static str, &'static str, &'static str) {
        match session_type {
            "interval" => ("hard, 8/10", "[MOCK] raise VO2max", "6 x 2 min fast, 1 min easy"),
            "long_run" => ("easy, 5/10", "[MOCK] build endurance", "steady long run"),
            "strength" => ("moderate", "[MOCK] build strength", "3 rounds: squats, lunges, plank"),
            "recovery" => ("very easy", "[MOCK] recover", "easy jog or brisk walk"),
            _ => ("easy, conversational", "[MOCK] aerobic base", "continuous easy run"),
        }
    }

    fn enrich(slot: &Value) -> Value {
        let session_type = slot.get("type").and_then(Value::as_str).unwrap_or("endurance");
        let (intensity, goal, main) = Self::guidance(session_type);
        json!({
            "dayOfWeek": slot.get("dayOfWeek").cloned().unwrap_or(Value::Null),
            "type": session_type,
            "durationMinutes": slot.get("durationMinutes").cloned().unwrap_or(Value::Null),
            "targetDistanceKm": slot.get("targetDistanceKm").cloned().unwrap_or(Value::Null),
            "intensity": intensity,
            "sessionGoal": goal,
            "details": {
                "warmup": "10 min easy",
                "main": main,
                "cooldown": "5 min walk + stretching"
            },
            "tips": ["Hydrate well", "Listen to your body"]
        })
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextGenerationPort for MockAiAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        info!(payload_len = request.user.len(), "[MOCK] simulating completion");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let payload: Value = serde_json::from_str(&request.user)
            .map_err(|e| DomainError::Ai(format!("[MOCK] payload is not JSON: {}", e)))?;

        let sessions: Vec<Value> = payload
            .get("skeletonSessions")
            .and_then(Value::as_array)
            .map(|slots| slots.iter().map(Self::enrich).collect())
            .unwrap_or_default();
        let level = payload
            .get("detectedLevel")
            .cloned()
            .unwrap_or_else(|| json!("unknown"));

        Ok(json!({ "level": level, "sessions": sessions }).to_string())
    }

    fn is_configured(&self) -> bool {
        true
    }
}
