use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;

use super::MessagingProvider;
use crate::models::Reply;

pub struct TelegramProvider {
    bot: Bot,
}

impl TelegramProvider {
    pub fn new(api_url: &str, bot_token: String) -> anyhow::Result<Self> {
        let api_url = Url::parse(api_url)
            .with_context(|| format!("invalid Telegram API url: {api_url}"))?;
        Ok(Self {
            bot: Bot::new(bot_token).set_api_url(api_url),
        })
    }

    /// Points Telegram at our webhook endpoint.
    pub async fn set_webhook(&self, url: &str, secret: &str) -> anyhow::Result<()> {
        let url = Url::parse(url).with_context(|| format!("invalid webhook url: {url}"))?;
        let mut request = self
            .bot
            .set_webhook(url)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery]);
        if !secret.is_empty() {
            request = request.secret_token(secret.to_string());
        }
        request.await.context("Telegram setWebhook failed")?;
        Ok(())
    }
}

fn chat_id(raw: &str) -> anyhow::Result<ChatId> {
    let id = raw
        .parse::<i64>()
        .with_context(|| format!("invalid chat id: {raw}"))?;
    Ok(ChatId(id))
}

#[async_trait]
impl MessagingProvider for TelegramProvider {
    async fn send_message(&self, chat_id_raw: &str, reply: &Reply) -> anyhow::Result<()> {
        let mut request = self.bot.send_message(chat_id(chat_id_raw)?, reply.text.clone());
        if let Some(markup) = &reply.markup {
            request = request.reply_markup(markup.clone());
        }
        request.await.context("Telegram sendMessage failed")?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> anyhow::Result<()> {
        let mut request = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(text) = alert {
            request = request.text(text.to_string()).show_alert(true);
        }
        request.await.context("Telegram answerCallbackQuery failed")?;
        Ok(())
    }
}
