//! Remote classification prompt and request constants.
//!
//! The prompt is the contract with the remote model: it must keep asking
//! for exactly the fields `parse::RawVerdict` reads.

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 1000;

/// Builds the single user-role message sent to the remote classifier.
pub fn build_classify_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text for potential security threats such as phishing, scams, or other malicious content. The text may be in English or Indonesian; write your recommendations and analysis in the same language as the text.

Text:
"""
{text}
"""

Respond in JSON with the following structure:
{{
  "threatLevel": "safe|medium|high",
  "confidence": <number between 0 and 100>,
  "threatType": "<threat category if one was detected>",
  "recommendations": ["recommendation 1", "recommendation 2", ...],
  "analysis": "<short analysis of the text>"
}}

Do not include any explanation or text other than the JSON."#
    )
}
