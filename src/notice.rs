// Transient user notices
//
// Every failure caught at an operation boundary, and a few successes, end up
// here as a short message that disappears after a fixed lifetime. Notices are
// advisory only and carry no retry action.

use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

/// Default lifetime of a notice before it is dismissed
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// CSS class used by the shell views
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "notice-info",
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Warning => "notice-warning",
            NoticeLevel::Error => "notice-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Error)
    }

    fn is_expired(&self, now: chrono::DateTime<chrono::Utc>, ttl: Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        now - self.created_at >= ttl
    }
}

/// Holds the notices that have not been dismissed yet
pub struct NoticeBoard {
    ttl: Duration,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn post(&self, notice: Notice) {
        tracing::debug!("Notice ({:?}): {}", notice.level, notice.message);
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }

    /// Notices still within their lifetime, oldest first
    ///
    /// Expired notices are dropped as a side effect.
    pub fn active(&self) -> Vec<Notice> {
        self.active_at(chrono::Utc::now())
    }

    fn active_at(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => {
                notices.retain(|n| !n.is_expired(now, self.ttl));
                notices.clone()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
