pub mod telegram;

use async_trait::async_trait;

use crate::models::Reply;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, chat_id: &str, reply: &Reply) -> anyhow::Result<()>;

    /// Acknowledges a button press, optionally with a popup alert.
    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> anyhow::Result<()>;
}
