//! Hover-driven window state (pure Rust, no FFI).
//!
//! The widget is collapsed until the pointer enters it. Leaving the widget
//! schedules a collapse after [`COLLAPSE_DELAY`]; entering again before the
//! delay elapses cancels it. Every scheduled collapse carries a token, and a
//! timer that fires with a token that is no longer pending is ignored.

use std::time::{Duration, Instant};

use super::constants::{COLLAPSED_SIZE, COLLAPSE_DELAY, EXPANDED_SIZE};

/// Visible state of the widget window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowState {
    #[default]
    Collapsed,
    Expanded,
}

impl WindowState {
    /// Edge length of the square window in this state.
    pub fn size(self) -> f64 {
        match self {
            WindowState::Collapsed => COLLAPSED_SIZE,
            WindowState::Expanded => EXPANDED_SIZE,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == WindowState::Expanded
    }

    /// Label drawn inside the widget.
    pub fn label(self) -> &'static str {
        match self {
            WindowState::Collapsed => "80×80",
            WindowState::Expanded => "400×400",
        }
    }
}

/// A collapse waiting for its quiet period to elapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCollapse {
    /// Identifies this schedule; stale tokens are ignored.
    pub token: u64,
    /// Instant at which the collapse becomes due.
    pub due: Instant,
    /// Delay the host timer should wait.
    pub delay: Duration,
}

/// Expanded/collapsed state with a debounced collapse.
#[derive(Debug)]
pub struct HoverStateMachine {
    state: WindowState,
    pending: Option<PendingCollapse>,
    next_token: u64,
    delay: Duration,
}

impl Default for HoverStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl HoverStateMachine {
    pub fn new() -> Self {
        Self::with_delay(COLLAPSE_DELAY)
    }

    /// Machine with a custom collapse delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: WindowState::Collapsed,
            pending: None,
            next_token: 1,
            delay,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn pending(&self) -> Option<PendingCollapse> {
        self.pending
    }

    /// Pointer entered the widget.
    ///
    /// Cancels any pending collapse and expands immediately. Returns the new
    /// state if it changed.
    pub fn hover_entered(&mut self) -> Option<WindowState> {
        self.pending = None;
        self.transition(WindowState::Expanded)
    }

    /// Pointer left the widget.
    ///
    /// Replaces any pending collapse with a fresh one. Returns the schedule the
    /// host must arm, or `None` when the widget is already collapsed.
    pub fn hover_exited(&mut self, now: Instant) -> Option<PendingCollapse> {
        self.pending = None;
        if self.state == WindowState::Collapsed {
            return None;
        }
        let pending = PendingCollapse {
            token: self.next_token,
            due: now + self.delay,
            delay: self.delay,
        };
        self.next_token += 1;
        self.pending = Some(pending);
        Some(pending)
    }

    /// Convenience entry for hosts that report a single hover flag.
    pub fn handle_hover(&mut self, hovering: bool, now: Instant) -> Option<WindowState> {
        if hovering {
            self.hover_entered()
        } else {
            self.hover_exited(now);
            None
        }
    }

    /// A host timer armed for `token` fired.
    pub fn collapse_elapsed(&mut self, token: u64) -> Option<WindowState> {
        match self.pending {
            Some(p) if p.token == token => {
                self.pending = None;
                self.transition(WindowState::Collapsed)
            }
            _ => None,
        }
    }

    /// Fires the pending collapse if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<WindowState> {
        match self.pending {
            Some(p) if now >= p.due => self.collapse_elapsed(p.token),
            _ => None,
        }
    }

    fn transition(&mut self, to: WindowState) -> Option<WindowState> {
        if self.state == to {
            return None;
        }
        self.state = to;
        Some(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_collapsed() {
        let machine = HoverStateMachine::new();
        assert_eq!(machine.state(), WindowState::Collapsed);
        assert!(machine.pending().is_none());
    }

    #[test]
    fn test_hover_enter_expands_immediately() {
        let mut machine = HoverStateMachine::new();
        assert_eq!(machine.hover_entered(), Some(WindowState::Expanded));
        assert_eq!(machine.state(), WindowState::Expanded);
    }

    #[test]
    fn test_repeated_enter_reports_no_change() {
        let mut machine = HoverStateMachine::new();
        machine.hover_entered();
        assert_eq!(machine.hover_entered(), None);
    }

    #[test]
    fn test_exit_schedules_collapse_with_delay() {
        let mut machine = HoverStateMachine::new();
        let now = Instant::now();
        machine.hover_entered();

        let pending = machine.hover_exited(now).expect("collapse scheduled");
        assert_eq!(pending.delay, COLLAPSE_DELAY);
        assert_eq!(pending.due, now + COLLAPSE_DELAY);
        assert_eq!(machine.state(), WindowState::Expanded);
    }

    #[test]
    fn test_exit_while_collapsed_schedules_nothing() {
        let mut machine = HoverStateMachine::new();
        assert!(machine.hover_exited(Instant::now()).is_none());
    }

    #[test]
    fn test_timer_fire_collapses() {
        let mut machine = HoverStateMachine::new();
        machine.hover_entered();
        let pending = machine.hover_exited(Instant::now()).unwrap();

        assert_eq!(
            machine.collapse_elapsed(pending.token),
            Some(WindowState::Collapsed)
        );
        assert!(machine.pending().is_none());
    }

    #[test]
    fn test_reenter_cancels_pending_collapse() {
        let mut machine = HoverStateMachine::new();
        machine.hover_entered();
        let pending = machine.hover_exited(Instant::now()).unwrap();
        machine.hover_entered();

        assert_eq!(machine.collapse_elapsed(pending.token), None);
        assert_eq!(machine.state(), WindowState::Expanded);
    }

    #[test]
    fn test_second_exit_invalidates_first_token() {
        let mut machine = HoverStateMachine::new();
        let now = Instant::now();
        machine.hover_entered();
        let first = machine.hover_exited(now).unwrap();
        let second = machine.hover_exited(now).unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(machine.collapse_elapsed(first.token), None);
        assert_eq!(
            machine.collapse_elapsed(second.token),
            Some(WindowState::Collapsed)
        );
    }

    #[test]
    fn test_poll_respects_due_instant() {
        let mut machine = HoverStateMachine::new();
        let now = Instant::now();
        machine.hover_entered();
        machine.hover_exited(now);

        assert_eq!(machine.poll(now + Duration::from_millis(499)), None);
        assert_eq!(
            machine.poll(now + COLLAPSE_DELAY),
            Some(WindowState::Collapsed)
        );
    }

    #[test]
    fn test_handle_hover_flag() {
        let mut machine = HoverStateMachine::with_delay(Duration::ZERO);
        let now = Instant::now();
        assert_eq!(machine.handle_hover(true, now), Some(WindowState::Expanded));
        assert_eq!(machine.handle_hover(false, now), None);
        assert_eq!(machine.poll(now), Some(WindowState::Collapsed));
    }

    #[test]
    fn test_state_sizes_and_labels() {
        assert_eq!(WindowState::Collapsed.size(), COLLAPSED_SIZE);
        assert_eq!(WindowState::Expanded.size(), EXPANDED_SIZE);
        assert_eq!(WindowState::Collapsed.label(), "80×80");
        assert_eq!(WindowState::Expanded.label(), "400×400");
    }
}
