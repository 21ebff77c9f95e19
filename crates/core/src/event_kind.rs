//! Achievement event kinds and the event processing state machine.
//!
//! [`EventKind`] is the closed set of domain activities the engine knows how
//! to evaluate. Each kind maps to a canonical action name used by count and
//! composite trigger configurations. [`ProcessingStatus`] models the
//! monotonic lifecycle of a logged event row.

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The kind of a logged achievement event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PostCreated,
    ReplyCreated,
    ThreadCreated,
    Login,
    TipSent,
    TipReceived,
    LikeGiven,
    LikeReceived,
    MentionReceived,
    DailyStreak,
    WalletLoss,
    ThreadNecromancy,
    CrashSentiment,
    DiamondHands,
    PaperHands,
    MarketPrediction,
    ThreadLocked,
    Custom,
}

/// Every kind, in declaration order. Used by validation and tests.
pub const ALL_EVENT_KINDS: [EventKind; 18] = [
    EventKind::PostCreated,
    EventKind::ReplyCreated,
    EventKind::ThreadCreated,
    EventKind::Login,
    EventKind::TipSent,
    EventKind::TipReceived,
    EventKind::LikeGiven,
    EventKind::LikeReceived,
    EventKind::MentionReceived,
    EventKind::DailyStreak,
    EventKind::WalletLoss,
    EventKind::ThreadNecromancy,
    EventKind::CrashSentiment,
    EventKind::DiamondHands,
    EventKind::PaperHands,
    EventKind::MarketPrediction,
    EventKind::ThreadLocked,
    EventKind::Custom,
];

impl EventKind {
    /// String representation for database storage and JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PostCreated => "post_created",
            EventKind::ReplyCreated => "reply_created",
            EventKind::ThreadCreated => "thread_created",
            EventKind::Login => "login",
            EventKind::TipSent => "tip_sent",
            EventKind::TipReceived => "tip_received",
            EventKind::LikeGiven => "like_given",
            EventKind::LikeReceived => "like_received",
            EventKind::MentionReceived => "mention_received",
            EventKind::DailyStreak => "daily_streak",
            EventKind::WalletLoss => "wallet_loss",
            EventKind::ThreadNecromancy => "thread_necromancy",
            EventKind::CrashSentiment => "crash_sentiment",
            EventKind::DiamondHands => "diamond_hands",
            EventKind::PaperHands => "paper_hands",
            EventKind::MarketPrediction => "market_prediction",
            EventKind::ThreadLocked => "thread_locked",
            EventKind::Custom => "custom",
        }
    }

    /// Parse from the stored string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_EVENT_KINDS.iter().copied().find(|k| k.as_str() == s)
    }

    /// Canonical action name used by count/composite trigger configurations.
    ///
    /// The mapping is fixed: producer domains emit event kinds, achievement
    /// definitions reference actions, and this table joins the two.
    pub fn action(&self) -> &'static str {
        match self {
            EventKind::PostCreated => "POST_CREATED",
            EventKind::ReplyCreated => "REPLY_CREATED",
            EventKind::ThreadCreated => "THREAD_CREATED",
            EventKind::Login => "LOGIN",
            EventKind::TipSent => "TIP_SENT",
            EventKind::TipReceived => "TIP_RECEIVED",
            EventKind::LikeGiven => "LIKE_GIVEN",
            EventKind::LikeReceived => "LIKE_RECEIVED",
            EventKind::MentionReceived => "MENTION_RECEIVED",
            EventKind::DailyStreak => "DAILY_STREAK",
            EventKind::WalletLoss => "WALLET_LOSS",
            EventKind::ThreadNecromancy => "THREAD_NECROMANCY",
            EventKind::CrashSentiment => "CRASH_SENTIMENT",
            EventKind::DiamondHands => "DIAMOND_HANDS",
            EventKind::PaperHands => "PAPER_HANDS",
            EventKind::MarketPrediction => "MARKET_PREDICTION",
            EventKind::ThreadLocked => "THREAD_LOCKED",
            EventKind::Custom => "CUSTOM",
        }
    }

    /// Find the kind whose canonical action matches `action`.
    pub fn from_action(action: &str) -> Option<Self> {
        ALL_EVENT_KINDS.iter().copied().find(|k| k.action() == action)
    }
}

// ---------------------------------------------------------------------------
// ProcessingStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a logged event row.
///
/// Transitions are monotonic: `Pending -> Processing -> {Completed, Failed}`.
/// Completed and failed rows are terminal and never re-enter the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// String representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Parse from the stored string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "processing" => Some(ProcessingStatus::Processing),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }

    /// Returns the set of valid target statuses reachable from `self`.
    ///
    /// Terminal states return an empty slice.
    pub fn valid_transitions(&self) -> &'static [ProcessingStatus] {
        match self {
            ProcessingStatus::Pending => &[ProcessingStatus::Processing],
            ProcessingStatus::Processing => {
                &[ProcessingStatus::Completed, ProcessingStatus::Failed]
            }
            ProcessingStatus::Completed | ProcessingStatus::Failed => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition(&self, to: ProcessingStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
