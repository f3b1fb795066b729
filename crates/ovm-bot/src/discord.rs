// serenity adapter: gateway events in, thread and guild capabilities out.

use anyhow::Result;
use async_trait::async_trait;
use ovm_persist::ThreadId;
use serenity::all::{
    ActivityData, Channel, ChannelId, ChannelType, Context, EditGuild, EditThread, EventHandler,
    GatewayIntents, GuildId, Message as SerenityMessage, OnlineStatus, Ready,
};
use serenity::http::Http;
use serenity::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, PresenceConfig};
use crate::pipeline::SupportPipeline;
use crate::platform::{AttachmentRef, Author, GuildHandle, IncomingMessage, ThreadChannel};
use crate::presence::PresenceUpdater;

pub struct DiscordThread {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordThread {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ThreadChannel for DiscordThread {
    async fn send(&self, text: &str) -> Result<()> {
        self.channel_id.say(&self.http, text).await?;
        Ok(())
    }
    
    async fn lock(&self) -> Result<()> {
        self.channel_id
            .edit_thread(&self.http, EditThread::new().locked(true))
            .await?;
        Ok(())
    }
}

pub struct DiscordGuild {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordGuild {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl GuildHandle for DiscordGuild {
    async fn rename(&self, name: &str) -> Result<()> {
        self.guild_id
            .edit(&self.http, EditGuild::new().name(name))
            .await?;
        Ok(())
    }
}

/// Bridges gateway events to the support pipeline.
struct Handler {
    pipeline: Arc<SupportPipeline>,
    activity: String,
    /// Set only when the presence updater should run
    presence_guild: Option<GuildId>,
    presence: PresenceConfig,
    presence_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(username = %ready.user.name, "Discord bot connected");
        ctx.set_presence(Some(ActivityData::playing(&self.activity)), OnlineStatus::Idle);
        
        // ready fires again after every reconnect
        let Some(guild_id) = self.presence_guild else {
            return;
        };
        if self.presence_started.swap(true, Ordering::SeqCst) {
            return;
        }
        
        let guild = Arc::new(DiscordGuild::new(ctx.http.clone(), guild_id));
        let updater = Arc::new(PresenceUpdater::from_config(&self.presence, guild));
        tokio::spawn(updater.run());
    }
    
    async fn message(&self, ctx: Context, msg: SerenityMessage) {
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }
        
        let incoming = resolve_message(&ctx, &msg).await;
        let channel = DiscordThread::new(ctx.http.clone(), msg.channel_id);
        
        let outcome = self.pipeline.handle(&channel, &incoming).await;
        debug!(thread_id = %incoming.thread_id, outcome = ?outcome, "Message handled");
    }
}

/// Collect what the pipeline needs to know about a message and its channel.
/// Only the channel lookup may hit REST; everything else comes from the event
/// or the cache.
async fn resolve_message(ctx: &Context, msg: &SerenityMessage) -> IncomingMessage {
    let (is_public_thread, parent_id, thread_owner_id) = if msg.guild_id.is_some() {
        resolve_thread(ctx, msg).await
    } else {
        (false, None, None)
    };
    
    let display_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string());
    
    let is_admin = msg
        .author_permissions(&ctx.cache)
        .is_some_and(|permissions| permissions.administrator());
    
    IncomingMessage {
        thread_id: ThreadId(msg.channel_id.get()),
        parent_id,
        is_public_thread,
        thread_owner_id,
        author: Author {
            id: msg.author.id.get(),
            display_name,
            is_admin,
        },
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|attachment| AttachmentRef {
                filename: attachment.filename.clone(),
                url: attachment.url.clone(),
                content_type: attachment.content_type.clone(),
            })
            .collect(),
    }
}

async fn resolve_thread(ctx: &Context, msg: &SerenityMessage) -> (bool, Option<u64>, Option<u64>) {
    match msg.channel(ctx).await {
        Ok(Channel::Guild(channel)) if channel.kind == ChannelType::PublicThread => (
            true,
            channel.parent_id.map(|id| id.get()),
            channel.owner_id.map(|id| id.get()),
        ),
        Ok(_) => (false, None, None),
        Err(e) => {
            warn!(channel_id = %msg.channel_id, error = %e, "Failed to resolve channel");
            (false, None, None)
        }
    }
}

/// `GuildId::new` panics on zero, so a zero id never gets that far
fn presence_guild(config: &Config) -> Option<GuildId> {
    match (config.presence.enabled, config.discord.guild_id) {
        (true, id) if id != 0 => Some(GuildId::new(id)),
        (true, _) => {
            warn!("Presence enabled without a guild id, not starting it");
            None
        }
        (false, _) => None,
    }
}

/// Connect to the gateway and serve until the client stops
pub async fn run(config: &Config, pipeline: Arc<SupportPipeline>) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    
    let handler = Handler {
        pipeline,
        activity: config.discord.activity.clone(),
        presence_guild: presence_guild(config),
        presence: config.presence.clone(),
        presence_started: AtomicBool::new(false),
    };
    
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;
    
    info!("Connecting to Discord gateway");
    client.start().await?;
    
    Ok(())
}
