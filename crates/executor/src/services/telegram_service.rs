use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{error, info};

/// Best-effort trade alerts. Returns whether the alert actually went out;
/// delivery failures are logged and swallowed.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> bool;
}

pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        info!("Telegram alerts enabled for chat {}", chat_id);
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl AlertNotifier for TelegramNotifier {
    async fn notify(&self, subject: &str, body: &str) -> bool {
        let text = format!("{}\n{}", subject, body);
        match self.bot.send_message(self.chat_id, text).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to send Telegram alert: {}", e);
                false
            }
        }
    }
}
