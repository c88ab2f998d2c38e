use chrono::Local;
use log::{debug, info, warn};
use std::sync::Arc;
use teloxide::utils::html::{bold, code_inline, escape};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::{ApiError, PriceSource};
use crate::chart;
use crate::format;
use crate::models::market::{PriceSample, TokenSnapshot};
use crate::telegram::Command;
use crate::validation::{parse_price, validate_pair_address};
use crate::watchlist::{AlertKind, Watchlist};

const SCAN_LIMIT: usize = 5;
const TOPCAP_CANDIDATES: usize = 10;
const TOPCAP_SHOWN: usize = 5;

/// One reply to deliver, in order, to the chat that sent the command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Image referenced by URL, sent without a caption.
    Photo(String),
    /// Rendered PNG chart with an HTML caption.
    Chart { png: Vec<u8>, caption: String },
    /// HTML-formatted text.
    Text(String),
}

/// Failures a command reports back to the user. `Display` is the reply text.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("❗ Usage: {}", code_inline(.0))]
    Usage(&'static str),
    #[error("❗ Price must be a positive number.")]
    InvalidPrice,
    #[error("❗ Invalid pair address: {}", code_inline(.0))]
    InvalidAddress(String),
    #[error("❌ Couldn't fetch data.")]
    DataUnavailable(#[from] ApiError),
    #[error("❌ No data yet. Use <code>/down</code> or <code>/up</code> first, then check back.")]
    NoHistory,
    #[error("❌ Couldn't render the chart.")]
    Chart(String),
}

type CommandResult = std::result::Result<Vec<Outgoing>, CommandError>;

/// Command handlers over a price source and a shared watchlist.
pub struct WatchBot<P> {
    source: Arc<P>,
    watchlist: Arc<Mutex<Watchlist>>,
}

impl<P> Clone for WatchBot<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            watchlist: self.watchlist.clone(),
        }
    }
}

impl<P: PriceSource> WatchBot<P> {
    pub fn new(source: P, watchlist: Watchlist) -> Self {
        Self {
            source: Arc::new(source),
            watchlist: Arc::new(Mutex::new(watchlist)),
        }
    }

    pub fn watchlist(&self) -> Arc<Mutex<Watchlist>> {
        self.watchlist.clone()
    }

    /// Runs one command to completion. Handler failures become a single text
    /// reply; nothing here is fatal.
    pub async fn dispatch(&self, command: Command) -> Vec<Outgoing> {
        let (name, raw_args) = command.split();
        let args: Vec<&str> = raw_args.split_whitespace().collect();
        info!("Handling /{} {:?}", name, args);

        let result = match &command {
            Command::Start | Command::Help => Ok(vec![Outgoing::Text(self.help_text().await)]),
            Command::Down(_) => self.set_alert(AlertKind::Down, &args).await,
            Command::Up(_) => self.set_alert(AlertKind::Up, &args).await,
            Command::Remove(_) => self.remove(&args).await,
            Command::List => Ok(vec![Outgoing::Text(self.list().await)]),
            Command::Price(_) => self.price(&args).await,
            Command::Chart(_) => self.chart(&args).await,
            Command::Scan => self.scan().await,
            Command::Topcap => Ok(vec![Outgoing::Text(self.topcap().await)]),
        };

        result.unwrap_or_else(|e| {
            warn!("/{} failed: {:?}", name, e);
            vec![Outgoing::Text(e.to_string())]
        })
    }

    async fn help_text(&self) -> String {
        let limit = self.watchlist.lock().await.history_limit();
        let rows = [
            ("🔻", "/down <pair> <price>", "Alert when the price drops below a level".to_string()),
            ("🟢", "/up <pair> <price>", "Alert when the price rises to a level".to_string()),
            ("❌", "/remove <pair>", "Stop tracking a pair".to_string()),
            ("📋", "/list", "Show every tracked pair".to_string()),
            ("📈", "/chart <pair>", format!("Chart of the last {} samples", limit)),
            ("💹", "/price <pair>", "Current price and FDV".to_string()),
            ("🧪", "/scan", "Quick scan of the newest tokens".to_string()),
            ("📊", "/topcap", "Newest tokens with the highest FDV".to_string()),
        ];

        let mut text = format!("👋 {}\n\n", bold("Welcome to the DEX token watch bot!"));
        for (icon, usage, description) in rows {
            text.push_str(&format!("{} {} – {}\n", icon, code_inline(usage), escape(&description)));
        }
        text.push_str(&format!(
            "\n🧪 {}\n{}\n{}\n{}",
            bold("Examples:"),
            code_inline("/down 5kFuc... 0.0026"),
            code_inline("/up 5kFuc... 0.0030"),
            code_inline("/price 5kFuc..."),
        ));
        text
    }

    async fn snapshot(&self, address: &str) -> std::result::Result<TokenSnapshot, CommandError> {
        Ok(self.source.fetch_token(address).await?)
    }

    /// Latest pairs, with any lookup failure collapsed to an empty list.
    async fn latest_pairs(&self, limit: usize) -> Vec<String> {
        self.source.fetch_latest_pairs(limit).await.unwrap_or_else(|e| {
            warn!("Latest pairs unavailable: {}", e);
            Vec::new()
        })
    }

    async fn set_alert(&self, kind: AlertKind, args: &[&str]) -> CommandResult {
        let usage = match kind {
            AlertKind::Down => "/down <pair> <price>",
            AlertKind::Up => "/up <pair> <price>",
        };
        let [address, raw_price] = args else {
            return Err(CommandError::Usage(usage));
        };
        let threshold = parse_price(raw_price).map_err(|_| CommandError::InvalidPrice)?;
        validate_pair_address(address).map_err(|_| CommandError::InvalidAddress(address.to_string()))?;

        let snapshot = self.snapshot(address).await?;
        let sample = PriceSample::new(Local::now().format("%H:%M").to_string(), snapshot.price);
        {
            let mut watchlist = self.watchlist.lock().await;
            let entry = watchlist.set_alert(address, kind, threshold, sample);
            debug!("{} now has {} samples", address, entry.history.len());
            debug!("Watchlist tracks {} pairs", watchlist.len());
        }

        let pct = format::deviation_pct(snapshot.price, threshold);
        let (headline, deviation, trigger) = match kind {
            AlertKind::Down => (
                format!("🔻 {}", bold("DOWN ALERT")),
                format::percent(pct, false),
                format!("$≤{}", format::threshold(threshold)),
            ),
            AlertKind::Up => (
                format!("🟢 {}", bold("UP ALERT")),
                format::percent(pct, true),
                format!("$≈{}", format::threshold(threshold)),
            ),
        };

        let mut replies = logo(&snapshot);
        replies.push(Outgoing::Text(format!(
            "{}\n[🪙 {}]\n{}\n\n💰 {} {} ({})\n📍 {} {}\n💵 {} {}",
            headline,
            token_label(&snapshot),
            code_inline(address),
            bold("Price:"),
            code_inline(&format::usd_price(snapshot.price)),
            deviation,
            bold("Alert Trigger:"),
            code_inline(&trigger),
            bold("FDV:"),
            code_inline(&format::usd_millions(snapshot.fdv)),
        )));
        Ok(replies)
    }

    async fn remove(&self, args: &[&str]) -> CommandResult {
        let Some(address) = args.first() else {
            return Err(CommandError::Usage("/remove <pair>"));
        };

        let removed = self.watchlist.lock().await.remove(address);
        let text = match removed {
            Some(_) => format!("🗑 Removed {} from the watchlist.", code_inline(address)),
            None => format!("⚠️ {} is not in the watchlist.", code_inline(address)),
        };
        Ok(vec![Outgoing::Text(text)])
    }

    async fn list(&self) -> String {
        let watchlist = self.watchlist.lock().await;
        if watchlist.is_empty() {
            return "📭 No tokens are being tracked yet.".to_string();
        }

        let lines: Vec<String> = watchlist
            .iter()
            .enumerate()
            .map(|(i, (address, entry))| {
                let mut parts = vec![format!("{}. {}", i + 1, code_inline(address))];
                if let Some(down) = entry.down_threshold {
                    parts.push(format!("🔻≤${}", format::threshold(down)));
                }
                if let Some(up) = entry.up_threshold {
                    parts.push(format!("🟢≈${}", format::threshold(up)));
                }
                parts.join(" | ")
            })
            .collect();

        format!("📋 {}\n{}", bold("Watchlist:"), lines.join("\n"))
    }

    async fn price(&self, args: &[&str]) -> CommandResult {
        let Some(address) = args.first() else {
            return Err(CommandError::Usage("/price <pair>"));
        };
        validate_pair_address(address).map_err(|_| CommandError::InvalidAddress(address.to_string()))?;

        let snapshot = self.snapshot(address).await?;
        let mut replies = logo(&snapshot);
        replies.push(Outgoing::Text(format!(
            "💹 {} {}\n🔗 {}\n\n💰 {} {}\n💵 {} {}",
            bold("Token:"),
            token_label(&snapshot),
            code_inline(address),
            bold("Price:"),
            code_inline(&format::usd_price(snapshot.price)),
            bold("FDV:"),
            code_inline(&format::usd_millions(snapshot.fdv)),
        )));
        Ok(replies)
    }

    async fn chart(&self, args: &[&str]) -> CommandResult {
        let Some(address) = args.first() else {
            return Err(CommandError::Usage("/chart <pair>"));
        };

        let samples: Vec<PriceSample> = {
            let watchlist = self.watchlist.lock().await;
            match watchlist.get(address) {
                Some(entry) if !entry.history.is_empty() => entry.history.iter().cloned().collect(),
                _ => return Err(CommandError::NoHistory),
            }
        };

        let count = samples.len();
        let owned_address = address.to_string();
        let png = tokio::task::spawn_blocking(move || chart::render_price_chart(&owned_address, &samples))
            .await
            .map_err(|e| CommandError::Chart(e.to_string()))?
            .map_err(|e| CommandError::Chart(e.to_string()))?;

        Ok(vec![Outgoing::Chart {
            png,
            caption: format!("🔍 Last {} samples {}", count, code_inline(address)),
        }])
    }

    async fn scan(&self) -> CommandResult {
        let pairs = self.latest_pairs(SCAN_LIMIT).await;
        if pairs.is_empty() {
            return Ok(vec![Outgoing::Text("❌ No new pairs found.".to_string())]);
        }

        let mut replies = Vec::new();
        let mut lines = Vec::new();
        for (i, address) in pairs.iter().enumerate() {
            let snapshot = match self.snapshot(address).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!("Skipping {} in scan: {:?}", address, e);
                    continue;
                }
            };
            replies.extend(logo(&snapshot));
            lines.push(format!(
                "{}\n➡️ /down {} {} or /up {} {}",
                ranked_line(i + 1, address, &snapshot),
                escape(address),
                escape("<price>"),
                escape(address),
                escape("<price>"),
            ));
        }

        replies.push(Outgoing::Text(format!(
            "{}\n{}",
            bold(&format!("🆕 Top {} newest tokens:", SCAN_LIMIT)),
            lines.join("\n")
        )));
        Ok(replies)
    }

    async fn topcap(&self) -> String {
        let pairs = self.latest_pairs(TOPCAP_CANDIDATES).await;

        let mut tokens = Vec::with_capacity(pairs.len());
        for address in pairs {
            match self.snapshot(&address).await {
                Ok(snapshot) if snapshot.fdv != 0.0 && snapshot.price != 0.0 => tokens.push((address, snapshot)),
                Ok(_) => debug!("Skipping {} in topcap: zero price or FDV", address),
                Err(e) => debug!("Skipping {} in topcap: {:?}", address, e),
            }
        }
        // Stable sort: equal valuations keep fetch order.
        tokens.sort_by(|(_, a), (_, b)| b.fdv.total_cmp(&a.fdv));

        let lines: Vec<String> = tokens
            .iter()
            .take(TOPCAP_SHOWN)
            .enumerate()
            .map(|(i, (address, snapshot))| ranked_line(i + 1, address, snapshot))
            .collect();

        format!("🏆 {}\n{}", bold("Top FDV Tokens:"), lines.join("\n"))
    }
}

fn logo(snapshot: &TokenSnapshot) -> Vec<Outgoing> {
    snapshot.logo_url.iter().cloned().map(Outgoing::Photo).collect()
}

fn token_label(snapshot: &TokenSnapshot) -> String {
    format!("{} (${})", escape(&snapshot.name), escape(&snapshot.symbol))
}

fn ranked_line(rank: usize, address: &str, snapshot: &TokenSnapshot) -> String {
    format!(
        "{}. {} – {} (${}): {} | FDV: {}",
        rank,
        code_inline(address),
        bold(&escape(&snapshot.name)),
        escape(&snapshot.symbol),
        code_inline(&format::usd_price(snapshot.price)),
        format::usd_millions(snapshot.fdv),
    )
}
