use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn title(self) -> &'static str {
        match self {
            ToastKind::Info => " Info ",
            ToastKind::Success => " Done ",
            ToastKind::Error => " Failed ",
        }
    }
}

/// Short-lived notice about the outcome of a setter.
#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub msg: String,
    pub until: Instant,
}

impl Toast {
    pub fn new(kind: ToastKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            until: Instant::now() + TOAST_TTL,
        }
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        now >= self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_expires_after_ttl() {
        let toast = Toast::new(ToastKind::Success, "wlan0: channel auto");
        assert!(!toast.expired_at(Instant::now()));
        assert!(toast.expired_at(Instant::now() + TOAST_TTL));
    }
}
