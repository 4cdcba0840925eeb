use std::{collections::VecDeque, fmt, time::Duration};

use tokio::time::{sleep_until, Instant};

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NoticeKind {
    pub fn icon(self) -> &'static str {
        match self {
            NoticeKind::Success => "✓",
            NoticeKind::Error => "✕",
            NoticeKind::Warning => "⚠",
            NoticeKind::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    raised_at: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn expires_at(&self) -> Instant {
        self.raised_at + self.ttl
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.message)
    }
}

/// Transient notifications, oldest first. Each one dismisses itself once its TTL passes.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: VecDeque<Notice>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: VecDeque::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raises a notice. Lapsed notices are dropped first.
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> &Notice {
        let now = Instant::now();
        self.prune(now);
        self.notices.push_back(Notice {
            kind,
            message: message.into(),
            raised_at: now,
            ttl: self.ttl,
        });
        &self.notices[self.notices.len() - 1]
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Warning, message);
    }

    /// Drops every notice whose TTL has elapsed at `now`. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        self.notices.retain(|notice| !notice.is_expired(now));
        before - self.notices.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        let now = Instant::now();
        self.notices.iter().filter(move |notice| !notice.is_expired(now))
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.notices.iter().map(Notice::expires_at).min()
    }

    /// Waits for the earliest notice to expire and removes it along with anything
    /// else that lapsed meanwhile. Returns immediately when the board is empty.
    pub async fn expire_next(&mut self) -> usize {
        let Some(deadline) = self.next_expiry() else {
            return 0;
        };
        sleep_until(deadline).await;
        self.prune(Instant::now())
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.notices.len()
    }
}
