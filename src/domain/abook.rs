use std::collections::BTreeMap;
use std::fmt;

/// Lower-cased email address; the identity key of the address book.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(String);

impl Address {
    /// Trim and lower-case `raw`. Returns `None` if nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let addr = raw.trim().to_lowercase();
        if addr.is_empty() {
            None
        } else {
            Some(Self(addr))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type DisplayName = String;

/// What `AddressBook::upsert` did with a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Renamed,
    Unchanged,
}

/// Address -> optional display name, one entry per address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    entries: BTreeMap<Address, Option<DisplayName>>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named pairs always overwrite; unnamed pairs only fill a missing entry.
    pub fn upsert(&mut self, addr: Address, name: Option<DisplayName>) -> Upsert {
        let name = name.filter(|n| !n.trim().is_empty());
        match name {
            Some(name) => match self.entries.insert(addr, Some(name.clone())) {
                None => Upsert::Inserted,
                Some(Some(prev)) if prev == name => Upsert::Unchanged,
                Some(_) => Upsert::Renamed,
            },
            None => {
                if self.entries.contains_key(&addr) {
                    Upsert::Unchanged
                } else {
                    self.entries.insert(addr, None);
                    Upsert::Inserted
                }
            }
        }
    }

    /// `None` if the address is unknown, `Some(None)` if it is known but nameless.
    pub fn get(&self, addr: &str) -> Option<Option<&str>> {
        Address::normalize(addr)
            .and_then(|a| self.entries.get(&a))
            .map(|n| n.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, Option<&str>)> {
        self.entries.iter().map(|(a, n)| (a, n.as_deref()))
    }

    /// Entries as they should be displayed: nameless entries are dropped,
    /// or given the address as their name when `email_as_name` is set.
    pub fn named_entries(&self, email_as_name: bool) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(move |(addr, name)| match name {
            Some(name) => Some((addr.as_str(), name)),
            None if email_as_name => Some((addr.as_str(), addr.as_str())),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::normalize(s).unwrap()
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(addr("  Foo@Bar.COM ").as_str(), "foo@bar.com");
        assert_eq!(Address::normalize("   "), None);
        assert_eq!(Address::normalize(""), None);
    }

    #[test]
    fn unnamed_never_clobbers_named() {
        let mut book = AddressBook::new();
        assert_eq!(book.upsert(addr("a@x"), Some("Alice".into())), Upsert::Inserted);
        assert_eq!(book.upsert(addr("a@x"), None), Upsert::Unchanged);
        assert_eq!(book.get("a@x"), Some(Some("Alice")));
    }

    #[test]
    fn last_name_wins() {
        let mut book = AddressBook::new();
        book.upsert(addr("a@x"), Some("Alice".into()));
        assert_eq!(book.upsert(addr("a@x"), Some("Alicia".into())), Upsert::Renamed);
        assert_eq!(book.get("a@x"), Some(Some("Alicia")));
    }

    #[test]
    fn named_fills_placeholder() {
        let mut book = AddressBook::new();
        book.upsert(addr("a@x"), None);
        assert_eq!(book.upsert(addr("a@x"), Some("Alice".into())), Upsert::Renamed);
        assert_eq!(book.get("A@X"), Some(Some("Alice")));
    }

    #[test]
    fn gap_fill_once() {
        let mut book = AddressBook::new();
        assert_eq!(book.upsert(addr("a@x"), None), Upsert::Inserted);
        assert_eq!(book.upsert(addr("a@x"), None), Upsert::Unchanged);
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("a@x"), Some(None));
    }

    #[test]
    fn blank_name_counts_as_unnamed() {
        let mut book = AddressBook::new();
        book.upsert(addr("a@x"), Some("Alice".into()));
        book.upsert(addr("a@x"), Some("  ".into()));
        assert_eq!(book.get("a@x"), Some(Some("Alice")));
    }

    #[test]
    fn named_entries_display_policy() {
        let mut book = AddressBook::new();
        book.upsert(addr("a@x"), Some("Alice".into()));
        book.upsert(addr("b@x"), None);

        let plain: Vec<_> = book.named_entries(false).collect();
        assert_eq!(plain, vec![("a@x", "Alice")]);

        let subst: Vec<_> = book.named_entries(true).collect();
        assert_eq!(subst, vec![("a@x", "Alice"), ("b@x", "b@x")]);
    }
}
