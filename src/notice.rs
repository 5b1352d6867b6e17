//! Transient, user-visible notices that dismiss themselves after a delay.
//!
//! A [`NoticeBoard`] holds at most one notice and at most one pending
//! dismissal timer. Showing a new notice aborts the previous timer, so an
//! older timer can never clear a newer notice.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Whether a notice reports success or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Default)]
struct State {
    current: Option<Notice>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Displays one [`Notice`] at a time and clears it `dismiss_after` it was
/// shown. Clones share the same board.
#[derive(Clone)]
pub struct NoticeBoard {
    state: Arc<Mutex<State>>,
    dismiss_after: Duration,
}

impl NoticeBoard {
    pub fn new(dismiss_after: Duration) -> NoticeBoard {
        NoticeBoard {
            state: Arc::new(Mutex::new(State::default())),
            dismiss_after,
        }
    }

    /// Replaces the current notice with `notice` and schedules its
    /// dismissal. Must be called from within a tokio runtime.
    pub fn show(&self, notice: Notice) {
        let deadline = Instant::now() + self.dismiss_after;
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        let generation = state.generation;
        debug!(kind = ?notice.kind, message = %notice.message, "showing notice");
        state.current = Some(notice);

        let shared = Arc::clone(&self.state);
        state.timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            let mut state = shared.lock();
            if state.generation == generation {
                state.current = None;
                state.timer = None;
            }
        }));
    }

    /// The notice currently on display, if any.
    pub fn current(&self) -> Option<Notice> {
        self.state.lock().current.clone()
    }

    /// Clears the current notice immediately and cancels its timer.
    pub fn dismiss(&self) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.current = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::time::advance;

    async fn settle() {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_dismisses_after_delay() {
        let board = NoticeBoard::new(Duration::from_millis(5000));
        board.show(Notice::error("Something went wrong"));
        assert_eq!(Some(Notice::error("Something went wrong")), board.current());

        advance(Duration::from_millis(4999)).await;
        settle().await;
        assert!(board.current().is_some());

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(None, board.current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_notice_cancels_older_timer() {
        let board = NoticeBoard::new(Duration::from_millis(5000));
        board.show(Notice::success("first"));

        advance(Duration::from_millis(3000)).await;
        settle().await;
        board.show(Notice::error("second"));

        // the first notice's deadline passes without clearing the second
        advance(Duration::from_millis(2500)).await;
        settle().await;
        assert_eq!(Some(Notice::error("second")), board.current());

        advance(Duration::from_millis(2500)).await;
        settle().await;
        assert_eq!(None, board.current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_clears_immediately() {
        let board = NoticeBoard::new(Duration::from_millis(5000));
        board.show(Notice::success("hi"));
        board.dismiss();
        assert_eq!(None, board.current());

        // a stale timer must not clear a later notice early
        board.show(Notice::success("again"));
        advance(Duration::from_millis(4000)).await;
        settle().await;
        assert!(board.current().is_some());
    }
}
