//! String storage for the debug info.
//!
//! There are two independent tables:
//!
//! - The debug string table, referenced from lexical data and textified callees. Entries are
//!   size-prefixed UTF-8 payloads, deduplicated by the *identity* of the [`Identifier`] that
//!   produced them, not by content.
//! - The filename table, built eagerly from every file a module references and deduplicated by
//!   content. Filenames are referenced by id from source locations and file regions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use fnv::FnvHashMap;
use indexmap::IndexSet;

use crate::leb128;

/// A handle to a uniqued string, as produced by the compiler's identifier table.
///
/// Clones share the identity of the original. Two identifiers created separately are distinct
/// even if they are spelled alike, and are interned into distinct string table slots.
#[derive(Clone)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Creates a new identifier with a fresh identity.
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// The UTF-8 contents of this identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const u8).hash(state)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The append-only debug string table under construction.
#[derive(Debug, Default)]
pub struct StringTableBuilder {
    /// The serialized table: size-prefixed UTF-8 payloads.
    bytes: Vec<u8>,
    /// A map from interned identities to their offset into `bytes`.
    ///
    /// The key keeps the identifier alive, so its identity can not be reused while we hold it.
    index: FnvHashMap<Identifier, u32>,
}

impl StringTableBuilder {
    /// Creates an empty string table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `ident`, returning its offset in the table.
    ///
    /// The first occurrence of an identity appends its payload; later occurrences return the
    /// cached offset.
    pub fn intern(&mut self, ident: &Identifier) -> u32 {
        if let Some(offset) = self.index.get(ident) {
            return *offset;
        }
        let offset = self.bytes.len() as u32;
        let payload = ident.as_str().as_bytes();
        leb128::write_uleb128(&mut self.bytes, payload.len() as u64);
        self.bytes.extend_from_slice(payload);
        self.index.insert(ident.clone(), offset);
        offset
    }

    /// The current size of the table in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the builder, yielding the serialized table.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decodes the size-prefixed string at `offset` of a serialized string table.
pub(crate) fn decode_string(table: &[u8], offset: u32) -> Option<&str> {
    let mut reader = leb128::Reader::new(table, offset as usize);
    let len = reader.read_uleb128()? as usize;
    let bytes = reader.read_bytes(len)?;
    std::str::from_utf8(bytes).ok()
}

/// A filename table that deduplicates filenames by content.
///
/// Ids are handed out in insertion order, starting at `0`.
#[derive(Debug, Default)]
pub struct FilenameTable {
    filenames: IndexSet<String>,
}

impl FilenameTable {
    /// Creates an empty filename table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `filename` to the table, returning its id.
    ///
    /// If the filename was already present, it is not added again.
    pub fn add_filename(&mut self, filename: &str) -> u32 {
        if let Some(idx) = self.filenames.get_index_of(filename) {
            return idx as u32;
        }
        self.filenames.insert_full(filename.to_owned()).0 as u32
    }

    /// The id of `filename`, if it is part of the table.
    pub fn get_id(&self, filename: &str) -> Option<u32> {
        self.filenames.get_index_of(filename).map(|idx| idx as u32)
    }

    /// The number of unique filenames.
    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

/// An entry of [`ConsecutiveStrings`], locating one string in the shared storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringTableEntry {
    /// Byte offset into the storage.
    pub offset: u32,
    /// Byte length of the string.
    pub length: u32,
}

impl StringTableEntry {
    fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// Finalized filename storage: all filenames concatenated, plus a table locating each one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsecutiveStrings {
    table: Vec<StringTableEntry>,
    storage: String,
}

impl ConsecutiveStrings {
    /// Builds the storage from already validated parts.
    ///
    /// Every entry must lie within `storage` on character boundaries.
    pub(crate) fn from_parts(table: Vec<StringTableEntry>, storage: String) -> Self {
        Self { table, storage }
    }

    /// The number of strings.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether there are no strings.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The string with the given `id`, if in bounds.
    pub fn get(&self, id: u32) -> Option<&str> {
        let entry = self.table.get(id as usize)?;
        self.storage.get(entry.range())
    }

    /// The table of entries.
    pub fn table(&self) -> &[StringTableEntry] {
        &self.table
    }

    /// The concatenated string bytes.
    pub fn storage(&self) -> &str {
        &self.storage
    }

    /// Iterates all strings in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.table
            .iter()
            .map(move |entry| &self.storage[entry.range()])
    }
}

impl From<FilenameTable> for ConsecutiveStrings {
    fn from(filenames: FilenameTable) -> Self {
        let mut table = Vec::with_capacity(filenames.len());
        let mut storage = String::new();
        for filename in filenames.filenames {
            table.push(StringTableEntry {
                offset: storage.len() as u32,
                length: filename.len() as u32,
            });
            storage.push_str(&filename);
        }
        Self { table, storage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_identity_is_idempotent() {
        let mut strings = StringTableBuilder::new();
        let foo = Identifier::new("foo");

        let first = strings.intern(&foo);
        let len = strings.len();
        let second = strings.intern(&foo.clone());

        assert_eq!(first, second);
        assert_eq!(strings.len(), len);
    }

    #[test]
    fn equal_contents_distinct_identities() {
        let mut strings = StringTableBuilder::new();
        let a = strings.intern(&Identifier::new("x"));
        let b = strings.intern(&Identifier::new("x"));

        assert_ne!(a, b);
        let table = strings.into_bytes();
        assert_eq!(decode_string(&table, a), Some("x"));
        assert_eq!(decode_string(&table, b), Some("x"));
    }

    #[test]
    fn string_table_is_size_prefixed() {
        let mut strings = StringTableBuilder::new();
        strings.intern(&Identifier::new("ab"));
        strings.intern(&Identifier::new("ü"));
        assert_eq!(strings.into_bytes(), [2, b'a', b'b', 2, 0xc3, 0xbc]);
    }

    #[test]
    fn decode_out_of_bounds() {
        assert_eq!(decode_string(&[5, b'a'], 0), None);
        assert_eq!(decode_string(&[], 3), None);
    }

    #[test]
    fn filenames_are_uniqued_by_content() {
        let mut filenames = FilenameTable::new();
        assert_eq!(filenames.add_filename("a.js"), 0);
        assert_eq!(filenames.add_filename("b.js"), 1);
        assert_eq!(filenames.add_filename("a.js"), 0);
        assert_eq!(filenames.get_id("b.js"), Some(1));
        assert_eq!(filenames.get_id("c.js"), None);

        let storage = ConsecutiveStrings::from(filenames);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.storage(), "a.jsb.js");
        assert_eq!(storage.get(1), Some("b.js"));
        assert_eq!(storage.get(2), None);
        assert_eq!(storage.iter().collect::<Vec<_>>(), ["a.js", "b.js"]);
    }
}
