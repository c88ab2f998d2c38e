use std::collections::VecDeque;

use crate::models::market::PriceSample;

/// Alert thresholds and recent price history for one pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchEntry {
    pub history: VecDeque<PriceSample>,
    pub down_threshold: Option<f64>,
    pub up_threshold: Option<f64>,
}

impl WatchEntry {
    fn record(&mut self, sample: PriceSample, limit: usize) {
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(sample);
    }
}

/// Which side of an alert a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Down,
    Up,
}

/// In-memory watchlist keyed by pair address, kept in insertion order.
/// An entry exists only after an alert has been set for its address.
#[derive(Debug, Clone)]
pub struct Watchlist {
    entries: Vec<(String, WatchEntry)>,
    history_limit: usize,
}

impl Watchlist {
    pub fn new(history_limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Sets one threshold for `address`, creating the entry if needed, and
    /// appends one price sample.
    pub fn set_alert(&mut self, address: &str, kind: AlertKind, threshold: f64, sample: PriceSample) -> &WatchEntry {
        let limit = self.history_limit;
        let index = match self.position(address) {
            Some(index) => index,
            None => {
                self.entries.push((address.to_string(), WatchEntry::default()));
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index].1;
        match kind {
            AlertKind::Down => entry.down_threshold = Some(threshold),
            AlertKind::Up => entry.up_threshold = Some(threshold),
        }
        entry.record(sample, limit);
        entry
    }

    /// Removes the entry for `address`, returning it if it existed.
    pub fn remove(&mut self, address: &str) -> Option<WatchEntry> {
        self.position(address).map(|index| self.entries.remove(index).1)
    }

    pub fn get(&self, address: &str) -> Option<&WatchEntry> {
        self.position(address).map(|index| &self.entries[index].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WatchEntry)> {
        self.entries.iter().map(|(address, entry)| (address.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, address: &str) -> Option<usize> {
        self.entries.iter().position(|(a, _)| a == address)
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_coexist() {
        let mut watchlist = Watchlist::default();
        watchlist.set_alert("PAIR", AlertKind::Down, 0.0026, PriceSample::new("10:00", 0.0028));
        let entry = watchlist.set_alert("PAIR", AlertKind::Up, 0.0030, PriceSample::new("10:01", 0.0029));

        assert_eq!(entry.down_threshold, Some(0.0026));
        assert_eq!(entry.up_threshold, Some(0.0030));
        assert_eq!(entry.history.len(), 2);
        assert_eq!(watchlist.len(), 1);
    }

    #[test]
    fn test_threshold_overwritten() {
        let mut watchlist = Watchlist::default();
        watchlist.set_alert("PAIR", AlertKind::Down, 1.0, PriceSample::new("10:00", 2.0));
        watchlist.set_alert("PAIR", AlertKind::Down, 1.5, PriceSample::new("10:05", 2.1));

        let entry = watchlist.get("PAIR").unwrap();
        assert_eq!(entry.down_threshold, Some(1.5));
        assert_eq!(entry.up_threshold, None);
        assert_eq!(entry.history.len(), 2);
    }

    #[test]
    fn test_history_is_capped_oldest_first() {
        let mut watchlist = Watchlist::new(3);
        for i in 0..5 {
            watchlist.set_alert("PAIR", AlertKind::Up, 1.0, PriceSample::new(format!("10:0{}", i), i as f64));
        }

        let prices: Vec<f64> = watchlist.get("PAIR").unwrap().history.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_remove_twice() {
        let mut watchlist = Watchlist::default();
        watchlist.set_alert("PAIR", AlertKind::Down, 1.0, PriceSample::new("10:00", 1.0));

        assert!(watchlist.remove("PAIR").is_some());
        assert!(watchlist.remove("PAIR").is_none());
        assert!(watchlist.is_empty());
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut watchlist = Watchlist::default();
        for address in ["C", "A", "B"] {
            watchlist.set_alert(address, AlertKind::Down, 1.0, PriceSample::new("10:00", 1.0));
        }
        watchlist.remove("A");

        let addresses: Vec<&str> = watchlist.iter().map(|(a, _)| a).collect();
        assert_eq!(addresses, vec!["C", "B"]);
    }
}
