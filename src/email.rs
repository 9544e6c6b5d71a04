// Verification email delivery over an HTTP mail bridge
//
// Delivery is best-effort: registration never waits on or fails with the
// mail send. Failures are logged and the at-most-once contract is accepted.

use serde::Serialize;

/// HTTP client for the transactional mail bridge
#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl EmailClient {
    pub fn new(base_url: String, sender: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url,
            sender,
        }
    }

    /// Send the account-verification email with the confirmation link
    pub async fn send_verification_email(
        &self,
        recipient: &str,
        verification_link: &str,
    ) -> Result<(), String> {
        let url = format!("{}/email", self.base_url);
        let html = format!(
            "<p>Welcome to Workzup!</p>\
             <p>Please <a href=\"{verification_link}\">verify your email</a> to activate your account. \
             The link expires in 24 hours.</p>"
        );
        let request = SendEmailRequest {
            from: &self.sender,
            to: recipient,
            subject: "Verify your Workzup account",
            html: &html,
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("failed to reach mail bridge: {e}"))?
            .error_for_status()
            .map_err(|e| format!("mail bridge returned error: {e}"))?;

        Ok(())
    }
}
