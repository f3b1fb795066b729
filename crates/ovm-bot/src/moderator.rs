/// Discord rejects messages longer than this many characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

pub const STARTUP_REFUSAL: &str =
    "❌ Sadly OneVM.eu does **not** allow to change startup command for free servers.";

pub const FORGET_DENIED: &str = "❌ You are not authorized to purge this thread’s history.";

pub const TOKEN_LIMIT_WARNING: &str = "🚫 Token limit reached. This thread is being locked to preserve performance. Please open a new support thread if needed.";

pub fn forget_confirmation(username: &str) -> String {
    format!("🧹 Thread history has been purged by {}.", username)
}

/// What a message asks the bot to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `!startup`: answered with a fixed refusal, in any channel
    Startup,
    /// `!forget`: wipe the thread's history
    Forget,
    /// Starts with `>`: a quote, not meant for the bot
    Quoted,
    /// Anything else goes to the model
    Chat,
}

impl Command {
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed == "!startup" {
            Self::Startup
        } else if content.starts_with('>') {
            Self::Quoted
        } else if trimmed == "!forget" {
            Self::Forget
        } else {
            Self::Chat
        }
    }
}

/// Per-thread context size cap, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextCap {
    pub max_chars: usize,
}

impl ContextCap {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
    
    pub fn is_exceeded_by(&self, total_chars: usize) -> bool {
        total_chars > self.max_chars
    }
}

/// Split `text` into consecutive chunks of at most `limit` characters.
///
/// Splits on character boundaries only; concatenating the chunks gives back
/// `text`. Empty input yields no chunks.
pub fn split_reply(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
