//! Inode ↔ path bookkeeping for the FUSE session.
//!
//! The kernel speaks inodes; the core is path-based. This table assigns a
//! stable inode number to each path the kernel has seen and releases it
//! when the kernel's lookup count drops to zero. It holds identity only,
//! never attributes or data, so it is not a query cache.

use std::collections::HashMap;

/// Inode number of the mount root.
pub const ROOT_INODE: u64 = 1;

struct Slot {
    path: String,
    lookups: u64,
}

/// Bidirectional ino ↔ path map with kernel lookup counts.
pub struct InodeTable {
    by_ino: HashMap<u64, Slot>,
    by_path: HashMap<String, u64>,
    next: u64,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut table = Self {
            by_ino: HashMap::new(),
            by_path: HashMap::new(),
            next: ROOT_INODE + 1,
        };
        table.by_ino.insert(
            ROOT_INODE,
            Slot {
                path: "/".to_owned(),
                lookups: 0,
            },
        );
        table.by_path.insert("/".to_owned(), ROOT_INODE);
        table
    }

    /// The path an inode refers to, if the kernel still knows it.
    pub fn path(&self, ino: u64) -> Option<&str> {
        self.by_ino.get(&ino).map(|slot| slot.path.as_str())
    }

    /// Inode for a path, assigning a fresh number on first sight.
    ///
    /// Does not touch lookup counts; used when an inode number is needed
    /// for a directory listing entry.
    pub fn ino_for(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.by_path.get(path) {
            return ino;
        }
        let ino = self.next;
        self.next += 1;
        self.by_ino.insert(
            ino,
            Slot {
                path: path.to_owned(),
                lookups: 0,
            },
        );
        self.by_path.insert(path.to_owned(), ino);
        ino
    }

    /// Inode for a path with the kernel's lookup count bumped; used when
    /// replying to a lookup request.
    pub fn assign(&mut self, path: &str) -> u64 {
        let ino = self.ino_for(path);
        if let Some(slot) = self.by_ino.get_mut(&ino) {
            slot.lookups += 1;
        }
        ino
    }

    /// Drop `nlookup` references; the mapping is released when the count
    /// reaches zero. The root is never released.
    pub fn forget(&mut self, ino: u64, nlookup: u64) {
        if ino == ROOT_INODE {
            return;
        }
        let remove = match self.by_ino.get_mut(&ino) {
            Some(slot) if nlookup > 0 => {
                slot.lookups = slot.lookups.saturating_sub(nlookup);
                slot.lookups == 0
            }
            _ => false,
        };
        if remove {
            if let Some(slot) = self.by_ino.remove(&ino) {
                self.by_path.remove(&slot.path);
            }
        }
    }

    /// Join a parent path and a child name into a child path.
    pub fn child_path(parent: &str, name: &str) -> String {
        if parent == "/" {
            format!("/{name}")
        } else {
            format!("{parent}/{name}")
        }
    }

    /// The parent path of a non-root path.
    pub fn parent_path(path: &str) -> &str {
        match path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &path[..idx],
        }
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_pinned() {
        let mut table = InodeTable::new();
        assert_eq!(table.path(ROOT_INODE), Some("/"));
        table.forget(ROOT_INODE, 100);
        assert_eq!(table.path(ROOT_INODE), Some("/"));
    }

    #[test]
    fn test_assign_is_stable() {
        let mut table = InodeTable::new();
        let a = table.assign("/t");
        let b = table.assign("/t");
        assert_eq!(a, b);
        assert_ne!(a, ROOT_INODE);
        assert_eq!(table.path(a), Some("/t"));
    }

    #[test]
    fn test_forget_releases_at_zero() {
        let mut table = InodeTable::new();
        let ino = table.assign("/t");
        let _ = table.assign("/t");
        table.forget(ino, 1);
        assert_eq!(table.path(ino), Some("/t"));
        table.forget(ino, 1);
        assert_eq!(table.path(ino), None);

        // A later lookup gets a fresh number.
        let again = table.assign("/t");
        assert_ne!(again, ino);
    }

    #[test]
    fn test_ino_for_does_not_count() {
        let mut table = InodeTable::new();
        let ino = table.ino_for("/t/1");
        table.forget(ino, 0);
        assert_eq!(table.path(ino), Some("/t/1"));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(InodeTable::child_path("/", "t"), "/t");
        assert_eq!(InodeTable::child_path("/t", "1"), "/t/1");
        assert_eq!(InodeTable::parent_path("/t/1/c"), "/t/1");
        assert_eq!(InodeTable::parent_path("/t"), "/");
        assert_eq!(InodeTable::parent_path("/"), "/");
    }
}
