use regex::Regex;

use crate::prelude::*;

/// Extract the anti-forgery token from the login page.
pub fn extract_verification_token(html: &str) -> Result<&str> {
    let input = Regex::new(r#"<input[^>]*name\s*=\s*["']__RequestVerificationToken["'][^>]*>"#)?;
    let value = Regex::new(r#"value\s*=\s*["']([^"']*)["']"#)?;
    let input = input.find(html).context("no verification token input on the login page")?;
    let token = value
        .captures(input.as_str())
        .and_then(|captures| captures.get(1))
        .context("the verification token input has no value")?;
    Ok(token.as_str())
}
