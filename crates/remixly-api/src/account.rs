// Account endpoints: subscription activation, referral stats and the
// contact form.

use reqwest::multipart::Form;
use tracing::debug;

use crate::client::RemixClient;
use crate::error::Error;
use crate::models::{ContactForm, ReferralData, SubscriptionBody};

impl RemixClient {
    /// Attach a payment-provider subscription to the logged-in account.
    pub async fn update_subscription(&self, subscription_id: &str) -> Result<(), Error> {
        let body = SubscriptionBody { subscription_id };
        let _: serde_json::Value = self.post_json("update_subscription", &body).await?;
        debug!("subscription updated");
        Ok(())
    }

    /// Referral code and reward counters for the logged-in account.
    pub async fn referral_data(&self) -> Result<ReferralData, Error> {
        let data: Option<ReferralData> = self.get_json("get_referral_data").await?;
        Ok(data.unwrap_or_default())
    }

    /// Submit the contact form as multipart form data.
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), Error> {
        let url = self.endpoint("contact")?;
        debug!("POST {}", url);

        let multipart = Form::new()
            .text("name", form.name.clone())
            .text("email", form.email.clone())
            .text("message", form.message.clone());

        let resp = self.http().post(url).multipart(multipart).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::rejection(status, &text));
        }
        Ok(())
    }
}
