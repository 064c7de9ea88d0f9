//! Prompt template for the financial analysis request.
//!
//! Centralising the prompt here keeps it inspectable by unit tests without a
//! live model; the analysis client only ever calls [`build_analysis_prompt`].

/// Ratio names the model is asked to compute, in display order.
pub const REQUIRED_RATIOS: [&str; 4] = [
    "Current Ratio",
    "Debt-to-Equity Ratio",
    "Net Profit Margin",
    "Return on Equity (ROE)",
];

/// Marker the model must use for a ratio it cannot derive from the text.
pub const NOT_AVAILABLE: &str = "N/A";

/// Line that fences the report text inside the prompt, above and below.
pub const TEXT_SEPARATOR: &str = "---";

/// Instructions placed before the report text.
const INSTRUCTIONS: &str = r#"You are FinSight, an expert financial analyst AI.
Your task is to analyze the text of a company's financial report.

Instructions:
1. Executive Summary: write a concise, professional summary of the company's financial health, performance and position based on the provided text. Highlight key strengths, weaknesses, opportunities and threats when they are apparent.
2. Key Ratios: calculate the following ratios when the data is available. If a value cannot be calculated from the text, return "N/A".
   - Current Ratio (Current Assets / Current Liabilities)
   - Debt-to-Equity Ratio (Total Liabilities / Total Equity)
   - Net Profit Margin (Net Income / Total Revenue)
   - Return on Equity (ROE) (Net Income / Total Equity)
3. Data Extraction: extract the key figures for the most recent year available from the Income Statement and the Balance Sheet. If a figure is not found, its value must be null.

Your entire response MUST be a single, valid JSON object. Do not include any text or markdown fences before or after the JSON object.

The required JSON structure is:
{
  "executive_summary": "Your detailed summary here.",
  "key_ratios": {
    "Current Ratio": "X.XX",
    "Debt-to-Equity Ratio": "X.XX",
    "Net Profit Margin": "XX.X%",
    "Return on Equity (ROE)": "XX.X%"
  },
  "extracted_data": {
    "Income Statement": {
      "Total Revenue": 1000000,
      "Net Income": 100000
    },
    "Balance Sheet": {
      "Total Current Assets": 500000,
      "Total Current Liabilities": 250000,
      "Total Liabilities": 400000,
      "Total Stockholders' Equity": 600000
    }
  }
}

Financial Text to Analyze:"#;

/// Closing line placed after the report text.
const CLOSING: &str = "Now, provide the JSON response.";

/// Build the full analysis prompt around the extracted report text.
///
/// The text is embedded verbatim between two [`TEXT_SEPARATOR`] lines.
pub fn build_analysis_prompt(text: &str) -> String {
    let mut prompt =
        String::with_capacity(INSTRUCTIONS.len() + text.len() + CLOSING.len() + 16);
    prompt.push_str(INSTRUCTIONS);
    prompt.push('\n');
    prompt.push_str(TEXT_SEPARATOR);
    prompt.push('\n');
    prompt.push_str(text);
    if !text.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str(TEXT_SEPARATOR);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Revenue: 100\nNet Income: 10\n";

    #[test]
    fn embeds_text_between_separators() {
        let prompt = build_analysis_prompt(REPORT);
        let fenced = format!("\n{TEXT_SEPARATOR}\n{REPORT}{TEXT_SEPARATOR}\n");
        assert!(prompt.contains(&fenced), "got: {prompt}");
    }

    #[test]
    fn text_without_trailing_newline_still_fenced() {
        let prompt = build_analysis_prompt("Revenue: 100");
        assert!(prompt.contains("\n---\nRevenue: 100\n---\n"));
    }

    #[test]
    fn names_all_required_ratios() {
        let prompt = build_analysis_prompt(REPORT);
        for ratio in REQUIRED_RATIOS {
            assert!(prompt.contains(ratio), "missing ratio {ratio}");
        }
        assert!(prompt.contains(&format!("\"{NOT_AVAILABLE}\"")));
    }

    #[test]
    fn demands_bare_json() {
        let prompt = build_analysis_prompt(REPORT);
        assert!(prompt.contains("single, valid JSON object"));
        assert!(prompt.contains("markdown fences"));
        assert!(prompt.contains("\"executive_summary\""));
        assert!(prompt.contains("\"key_ratios\""));
        assert!(prompt.contains("\"extracted_data\""));
        assert!(prompt.contains("must be null"));
    }

    #[test]
    fn assigns_analyst_persona() {
        assert!(build_analysis_prompt(REPORT).starts_with("You are FinSight, an expert financial analyst"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_analysis_prompt(REPORT), build_analysis_prompt(REPORT));
    }
}
