use std::sync::Arc;

use chrono::Utc;
use tokio::io::BufReader;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use uuid::Uuid;

use task_relay::config::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH, RelayConfig};
use task_relay::pipeline::types::{InboundMessage, QuotedMessage};
use task_relay::pipeline::MessageProcessor;
use task_relay::transport::{ConsoleTransport, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Point {CONFIG_ENV_VAR} at a config file (default: ./{DEFAULT_CONFIG_PATH})");
        eprintln!("  Example:");
        eprintln!("{}", example_config());
        std::process::exit(1);
    });

    eprintln!("📨 Task Relay v{}", env!("CARGO_PKG_VERSION"));
    for (name, category) in &config.categories {
        eprintln!("   Category: {name} → {}", category.destination);
    }
    eprintln!("   Audit channel: {}", config.audit_channel);
    eprintln!(
        "   Watching: {}",
        if config.watch_channels.is_empty() {
            "all channels".to_string()
        } else {
            config.watch_channels.join(", ")
        }
    );
    eprintln!("   Task marker: {:?}", config.task_marker);
    eprintln!();
    eprintln!("   Type a message to inject it into the watched channel.");
    eprintln!("   @<channel> <text>      post from a specific channel");
    eprintln!("   /reply <id> <text>     reply quoting a previously sent message");
    eprintln!("   /pending               list unconfirmed tasks");
    eprintln!("   /reload                re-read keyword sources");
    eprintln!("   /quit                  exit\n");

    let transport = Arc::new(ConsoleTransport::new());
    let processor =
        MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    let default_channel = config
        .watch_channels
        .first()
        .cloned()
        .unwrap_or_else(|| "console".to_string());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = LinesStream::new(tokio::io::AsyncBufReadExt::lines(stdin));

    while let Some(line) = lines.next().await {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Optional "@channel" prefix picks the posting channel
        let (channel, rest) = match line.strip_prefix('@').and_then(|r| r.split_once(' ')) {
            Some((channel, rest)) => (channel.to_string(), rest.trim()),
            None => (default_channel.clone(), line),
        };

        match rest.split_once(' ') {
            _ if rest == "/quit" => break,
            _ if rest == "/reload" => {
                processor.reload_keywords().await;
                continue;
            }
            _ if rest == "/pending" => {
                let pending = processor.pending_tasks().await;
                if pending.is_empty() {
                    eprintln!("   No pending tasks");
                }
                for task in pending {
                    eprintln!(
                        "   [{}] {} — {} (since {})",
                        task.forwarded_id, task.category, task.task_text, task.created_at
                    );
                }
                continue;
            }
            Some(("/reply", args)) => {
                let Some((quoted_id, text)) = args.trim().split_once(' ') else {
                    eprintln!("   Usage: /reply <id> <text>");
                    continue;
                };
                let Some(quoted_text) = transport.sent_text(quoted_id).await else {
                    eprintln!("   No sent message with id {quoted_id}");
                    continue;
                };
                let message = inbound(
                    &channel,
                    text,
                    Some(QuotedMessage {
                        id: quoted_id.to_string(),
                        text: quoted_text,
                    }),
                );
                processor.handle(message).await;
                continue;
            }
            _ => {}
        }

        processor.handle(inbound(&channel, rest, None)).await;
    }

    Ok(())
}

fn inbound(channel: &str, text: &str, quoted: Option<QuotedMessage>) -> InboundMessage {
    InboundMessage {
        id: Uuid::new_v4().to_string(),
        channel_id: channel.to_string(),
        sender: "console".to_string(),
        text: text.to_string(),
        has_attachment: false,
        quoted,
        received_at: Utc::now(),
    }
}

fn example_config() -> &'static str {
    r#"  {
    "categories": {
      "it": { "keywords": "keywords_it.txt", "destination": "it-group" },
      "maintenance": { "keywords": "keywords_man.txt", "destination": "man-group" }
    },
    "confirmation_phrases": "keywords_confirm.txt",
    "audit_channel": "ops-audit",
    "watch_channels": ["front-desk"]
  }"#
}
