use log::{error, info, warn};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use teloxide::utils::command::BotCommands;

use crate::api::PriceSource;
use crate::bot::{Outgoing, WatchBot};
use crate::error::Result;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Quick scan of the newest tokens")]
    Scan,
    #[command(description = "Alert below a price: /down <pair> <price>")]
    Down(String),
    #[command(description = "Alert at or above a price: /up <pair> <price>")]
    Up(String),
    #[command(description = "Stop tracking a pair: /remove <pair>")]
    Remove(String),
    #[command(description = "List tracked pairs")]
    List,
    #[command(description = "Chart recent samples: /chart <pair>")]
    Chart(String),
    #[command(description = "Current price and FDV: /price <pair>")]
    Price(String),
    #[command(description = "Newest tokens with the highest FDV")]
    Topcap,
}

impl Command {
    /// Command keyword and its raw, unsplit argument text.
    pub fn split(&self) -> (&'static str, &str) {
        match self {
            Command::Start => ("start", ""),
            Command::Help => ("help", ""),
            Command::Scan => ("scan", ""),
            Command::Down(args) => ("down", args),
            Command::Up(args) => ("up", args),
            Command::Remove(args) => ("remove", args),
            Command::List => ("list", ""),
            Command::Chart(args) => ("chart", args),
            Command::Price(args) => ("price", args),
            Command::Topcap => ("topcap", ""),
        }
    }
}

/// Long-polling Telegram front-end for a `WatchBot`.
pub struct TelegramBot<P> {
    bot: Bot,
    handler: WatchBot<P>,
    admin_chat_id: Option<ChatId>,
}

impl<P: PriceSource + 'static> TelegramBot<P> {
    pub fn new(bot_token: String, admin_chat_id: Option<i64>, handler: WatchBot<P>) -> Self {
        Self {
            bot: Bot::new(bot_token),
            handler,
            admin_chat_id: admin_chat_id.map(ChatId),
        }
    }

    /// Clears any registered webhook, publishes the command list and then
    /// polls until the process is stopped.
    pub async fn start(self) -> Result<()> {
        let me = self.bot.get_me().await?;
        info!("Telegram bot initialized: @{}", me.username());
        if let Some(admin) = self.admin_chat_id {
            info!("Admin chat id: {}", admin.0);
        }

        self.bot.delete_webhook().drop_pending_updates(true).await?;
        self.bot.set_my_commands(Command::bot_commands()).await?;
        info!("Bot is ready: /down, /up, /remove, /list, /chart, /price, /scan, /topcap");

        let handler = self.handler.clone();
        Command::repl(self.bot, move |bot: Bot, msg: Message, cmd: Command| {
            let handler = handler.clone();
            async move {
                let replies = handler.dispatch(cmd).await;
                deliver(&bot, msg.chat.id, replies).await;
                respond(())
            }
        })
        .await;

        Ok(())
    }
}

/// Sends replies in order. A failed send is logged and the rest still go out.
async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Outgoing>) {
    for reply in replies {
        let sent = match reply {
            Outgoing::Photo(url) => match reqwest::Url::parse(&url) {
                Ok(url) => bot.send_photo(chat_id, InputFile::url(url)).await.map(|_| ()),
                Err(e) => {
                    warn!("Skipping logo with invalid URL {:?}: {}", url, e);
                    continue;
                }
            },
            Outgoing::Chart { png, caption } => bot
                .send_photo(chat_id, InputFile::memory(png).file_name("chart.png"))
                .caption(caption)
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ()),
            Outgoing::Text(text) => bot
                .send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ()),
        };

        if let Err(e) = sent {
            error!("Failed to deliver reply to chat {}: {}", chat_id.0, e);
        }
    }
}
