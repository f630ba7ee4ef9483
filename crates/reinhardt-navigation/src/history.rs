//! Cursor-indexed log of committed locations.

use crate::location::Location;

/// Ordered history entries plus the index of the active one.
///
/// Mirrors native session history: writing after a step back drops the
/// entries that were ahead of the cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
	entries: Vec<Location>,
	cursor: Option<usize>,
}

impl HistoryStack {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `location`.
	///
	/// Without an index this is a forward push: everything after the cursor
	/// is discarded and the location is appended. With an index (used by
	/// traversals) the slot is overwritten in place, or appended when it is
	/// one past the end.
	pub fn set_history(&mut self, location: Location, index: Option<usize>) {
		let index = match index {
			Some(index) if index < self.entries.len() => {
				self.entries[index] = location;
				index
			}
			Some(_) | None => {
				let next = self.cursor.map_or(0, |cursor| cursor + 1);
				self.entries.truncate(next);
				self.entries.push(location);
				next
			}
		};
		self.cursor = Some(index);
	}

	/// Overwrites the active entry; records a first entry when empty.
	pub fn replace_history(&mut self, location: Location) {
		match self.cursor {
			Some(cursor) => self.entries[cursor] = location,
			None => self.set_history(location, None),
		}
	}

	/// Index `offset` steps away from the cursor, when an entry exists there.
	pub fn offset_index(&self, offset: isize) -> Option<usize> {
		let cursor = self.cursor?;
		let index = cursor.checked_add_signed(offset)?;
		(index < self.entries.len()).then_some(index)
	}

	/// Entry `offset` steps away from the cursor.
	pub fn entry_at(&self, offset: isize) -> Option<&Location> {
		self.offset_index(offset).map(|index| &self.entries[index])
	}

	/// Index of the active entry.
	pub fn cursor(&self) -> Option<usize> {
		self.cursor
	}

	/// Active entry.
	pub fn current(&self) -> Option<&Location> {
		self.cursor.map(|cursor| &self.entries[cursor])
	}

	/// All entries, oldest first.
	pub fn entries(&self) -> &[Location] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` before the first commit.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	fn loc(url: &str) -> Location {
		Location::new(url, url)
	}

	fn urls(history: &HistoryStack) -> Vec<&str> {
		history.entries().iter().map(|l| l.url.as_str()).collect()
	}

	#[fixture]
	fn abc() -> HistoryStack {
		let mut history = HistoryStack::new();
		for url in ["/a", "/b", "/c"] {
			history.set_history(loc(url), None);
		}
		history
	}

	#[rstest]
	fn test_push_advances_cursor(abc: HistoryStack) {
		assert_eq!(urls(&abc), vec!["/a", "/b", "/c"]);
		assert_eq!(abc.cursor(), Some(2));
		assert_eq!(abc.current().unwrap().url, "/c");
	}

	#[rstest]
	fn test_push_after_back_truncates(mut abc: HistoryStack) {
		abc.set_history(loc("/a"), Some(0));
		abc.set_history(loc("/d"), None);

		assert_eq!(urls(&abc), vec!["/a", "/d"]);
		assert_eq!(abc.cursor(), Some(1));
		assert!(abc.entry_at(1).is_none());
	}

	#[rstest]
	fn test_indexed_write_keeps_forward_entries(mut abc: HistoryStack) {
		abc.set_history(loc("/b2"), Some(1));

		assert_eq!(urls(&abc), vec!["/a", "/b2", "/c"]);
		assert_eq!(abc.cursor(), Some(1));
		assert_eq!(abc.entry_at(1).unwrap().url, "/c");
	}

	#[rstest]
	fn test_replace_overwrites_active(mut abc: HistoryStack) {
		abc.replace_history(loc("/z"));

		assert_eq!(urls(&abc), vec!["/a", "/b", "/z"]);
		assert_eq!(abc.cursor(), Some(2));
	}

	#[rstest]
	fn test_replace_on_empty_records_first_entry() {
		let mut history = HistoryStack::new();
		history.replace_history(loc("/first"));

		assert_eq!(urls(&history), vec!["/first"]);
		assert_eq!(history.cursor(), Some(0));
	}

	#[rstest]
	#[case(0, Some("/c"))]
	#[case(-1, Some("/b"))]
	#[case(-2, Some("/a"))]
	#[case(-3, None)]
	#[case(1, None)]
	fn test_entry_at(abc: HistoryStack, #[case] offset: isize, #[case] expected: Option<&str>) {
		assert_eq!(abc.entry_at(offset).map(|l| l.url.as_str()), expected);
	}

	#[rstest]
	fn test_empty_history_has_no_entries() {
		let history = HistoryStack::new();

		assert!(history.is_empty());
		assert!(history.current().is_none());
		assert!(history.entry_at(0).is_none());
	}
}
