use chrono::Local;

/// Default bound on the feed; the oldest entries are dropped past this.
pub const DEFAULT_CAPACITY: usize = 100;

/// Ephemeral client-side notification. Never persisted remotely.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    pub read: bool,
}

/// Newest-first feed with a fixed capacity and an unread counter.
#[derive(Debug)]
pub struct NotificationFeed {
    entries: Vec<Notification>,
    unread: usize,
    capacity: usize,
    next_id: u64,
}

impl NotificationFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            unread: 0,
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepends a new unread entry, evicting the oldest past capacity.
    pub fn push(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            0,
            Notification {
                id,
                title: title.into(),
                message: message.into(),
                timestamp: Local::now().format("%H:%M").to_string(),
                read: false,
            },
        );
        self.unread += 1;
        while self.entries.len() > self.capacity {
            if let Some(dropped) = self.entries.pop() {
                if !dropped.read {
                    self.unread -= 1;
                }
            }
        }
    }

    pub fn mark_all_read(&mut self) {
        self.unread = 0;
        for entry in &mut self.entries {
            entry.read = true;
        }
    }

    pub fn remove(&mut self, id: u64) {
        if let Some(pos) = self.entries.iter().position(|n| n.id == id) {
            let removed = self.entries.remove(pos);
            if !removed.read {
                self.unread -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_prepends_unread() {
        let mut feed = NotificationFeed::new(10);
        feed.push("First", "a");
        feed.push("Second", "b");

        assert_eq!(feed.entries().len(), 2);
        assert_eq!(feed.entries()[0].title, "Second");
        assert!(!feed.entries()[0].read);
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut feed = NotificationFeed::new(3);
        for i in 0..5 {
            feed.push(format!("n{i}"), "");
        }
        assert_eq!(feed.entries().len(), 3);
        assert_eq!(feed.entries()[0].title, "n4");
        assert_eq!(feed.entries()[2].title, "n2");
        assert_eq!(feed.unread_count(), 3);
    }

    #[test]
    fn test_mark_all_read_zeroes_counter() {
        let mut feed = NotificationFeed::new(10);
        feed.push("a", "");
        feed.push("b", "");
        feed.mark_all_read();

        assert_eq!(feed.unread_count(), 0);
        assert!(feed.entries().iter().all(|n| n.read));
    }

    #[test]
    fn test_remove_filters_entry_and_adjusts_unread() {
        let mut feed = NotificationFeed::new(10);
        feed.push("a", "");
        feed.push("b", "");
        let id = feed.entries()[1].id;

        feed.remove(id);
        assert_eq!(feed.entries().len(), 1);
        assert_eq!(feed.entries()[0].title, "b");
        assert_eq!(feed.unread_count(), 1);

        // Removing an unknown id is a no-op.
        feed.remove(999);
        assert_eq!(feed.entries().len(), 1);
    }
}
