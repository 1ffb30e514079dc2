//! Stale-response detection
//!
//! Each fetch takes a [`Ticket`] before it starts. When the response arrives it
//! is applied only if no newer ticket was issued in the meantime.

/// Generation number handed to one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    current: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, making every earlier ticket stale
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Make all outstanding tickets stale without starting a request
    pub fn invalidate(&mut self) {
        self.current += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_wins() {
        let mut guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_invalidate() {
        let mut guard = RequestGuard::new();
        let ticket = guard.issue();
        guard.invalidate();
        assert!(!guard.is_current(ticket));
    }
}
