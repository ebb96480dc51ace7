use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire shape of an exempt-day rule. Weekdays count 0 = Sunday … 6 = Saturday;
/// platforms that number from Monday convert before building this payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ExemptRulePayload {
    Weekly(WeeklyRulePayload),
    Range(RangeRulePayload),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyRulePayload {
    pub weekday: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeRulePayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExemptRuleRecord {
    pub id: i64,
    #[serde(flatten)]
    pub rule: ExemptRulePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExemptRulesBody {
    pub rules: Vec<ExemptRuleRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleCreatedBody {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_payload_wire_shape_is_tagged() {
        let weekly = ExemptRulePayload::Weekly(WeeklyRulePayload { weekday: 6 });
        assert_eq!(
            serde_json::to_value(weekly).unwrap(),
            serde_json::json!({"type": "weekly", "data": {"weekday": 6}})
        );

        let range: ExemptRulePayload = serde_json::from_value(serde_json::json!({
            "type": "range",
            "data": {"start_date": "2024-12-20", "end_date": "2024-12-31"}
        }))
        .unwrap();
        assert_eq!(
            range,
            ExemptRulePayload::Range(RangeRulePayload {
                start_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            })
        );
    }
}
