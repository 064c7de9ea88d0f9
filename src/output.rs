//! The structured result of one analysis.

use crate::prompts::NOT_AVAILABLE;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// What the model returned for one report.
///
/// Field order in `key_ratios` and `extracted_data` follows the reply, so the
/// ratio columns appear in the order the model listed them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Prose summary of the company's financial position.
    #[serde(default)]
    pub executive_summary: Option<String>,

    /// Ratio name → value, e.g. `"Current Ratio": "1.52"` or `"N/A"`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key_ratios: Map<String, Value>,

    /// Statement name → line item → number or null.
    #[serde(default)]
    pub extracted_data: Option<Value>,
}

impl AnalysisResult {
    /// Ratios as `(label, display value)` pairs in reply order.
    pub fn ratios(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.key_ratios
            .iter()
            .map(|(name, value)| (name.as_str(), display_value(value)))
    }

    /// Look up a numeric figure, e.g. `figure("Income Statement", "Net Income")`.
    ///
    /// Returns `None` when the statement or item is absent, null, or not a number.
    pub fn figure(&self, statement: &str, item: &str) -> Option<f64> {
        self.extracted_data
            .as_ref()?
            .get(statement)?
            .get(item)?
            .as_f64()
    }

    /// True when the model could not compute any ratio.
    pub fn all_ratios_unavailable(&self) -> bool {
        self.key_ratios
            .values()
            .all(|v| v.is_null() || v.as_str() == Some(NOT_AVAILABLE))
    }
}

/// Render a ratio value for display: strings verbatim, null as `N/A`,
/// anything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AnalysisResult {
        serde_json::from_value(json!({
            "executive_summary": "Solid liquidity.",
            "key_ratios": {
                "Net Profit Margin": "10.0%",
                "Current Ratio": 2.0,
                "Return on Equity (ROE)": null,
                "Debt-to-Equity Ratio": "N/A"
            },
            "extracted_data": {
                "Income Statement": { "Total Revenue": 1000, "Net Income": 100 },
                "Balance Sheet": { "Total Liabilities": null }
            }
        }))
        .expect("valid result")
    }

    #[test]
    fn ratios_keep_reply_order() {
        let r = sample();
        let labels: Vec<&str> = r.ratios().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec![
                "Net Profit Margin",
                "Current Ratio",
                "Return on Equity (ROE)",
                "Debt-to-Equity Ratio"
            ]
        );
    }

    #[test]
    fn ratio_values_are_displayable() {
        let r = sample();
        let values: Vec<String> = r.ratios().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["10.0%", "2.0", "N/A", "N/A"]);
    }

    #[test]
    fn figure_lookup() {
        let r = sample();
        assert_eq!(r.figure("Income Statement", "Net Income"), Some(100.0));
        assert_eq!(r.figure("Balance Sheet", "Total Liabilities"), None);
        assert_eq!(r.figure("Cash Flow", "Operating Cash Flow"), None);
    }

    #[test]
    fn missing_fields_default() {
        let r: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert!(r.executive_summary.is_none());
        assert!(r.key_ratios.is_empty());
        assert!(r.extracted_data.is_none());
    }

    #[test]
    fn null_key_ratios_is_empty_map() {
        let r: AnalysisResult = serde_json::from_str(r#"{"key_ratios": null}"#).unwrap();
        assert!(r.key_ratios.is_empty());
    }

    #[test]
    fn all_unavailable_detection() {
        let r: AnalysisResult = serde_json::from_value(json!({
            "key_ratios": { "Current Ratio": "N/A", "Net Profit Margin": null }
        }))
        .unwrap();
        assert!(r.all_ratios_unavailable());
        assert!(!sample().all_ratios_unavailable());
    }
}
