use crate::join::{binds_key, hash_row, RowHasher};
use itertools::Either;
use quack_model::{JoinKey, Row, RowValue};
use rustc_hash::FxHashMap;

/// The hash table of a hash join.
///
/// Rows that bind every key variable are stored in buckets by their key hash. All other rows are
/// stored in the no-key bucket, as they can be compatible with rows of any hash.
///
/// Looking up a probe row that binds every key variable returns its bucket and the no-key bucket.
/// Other probe rows are compared with every stored row. Callers must confirm each candidate with
/// [merge](crate::join::merge), as hashes can collide and non-key variables can conflict.
#[derive(Debug)]
pub struct HashProbeTable<X> {
    key: JoinKey,
    buckets: FxHashMap<u64, Vec<Row<X>>>,
    no_key_bucket: Vec<Row<X>>,
    len: usize,
}

impl<X: RowValue> HashProbeTable<X> {
    /// Creates a new, empty [HashProbeTable].
    pub fn new(key: JoinKey) -> Self {
        Self {
            key,
            buckets: FxHashMap::default(),
            no_key_bucket: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether no row has been stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of hash buckets, not counting the no-key bucket.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of rows in the no-key bucket.
    pub fn num_no_key_rows(&self) -> usize {
        self.no_key_bucket.len()
    }

    /// Inserts `row`.
    pub fn insert<H: RowHasher<X> + ?Sized>(&mut self, hasher: &H, row: Row<X>) {
        match self.bucket_hash(hasher, &row) {
            Some(hash) => self.buckets.entry(hash).or_default().push(row),
            None => self.no_key_bucket.push(row),
        }
        self.len += 1;
    }

    /// Returns the hash of the bucket that holds `row`, or [None] if the row belongs to the no-key
    /// bucket.
    pub fn bucket_hash<H: RowHasher<X> + ?Sized>(&self, hasher: &H, row: &Row<X>) -> Option<u64> {
        (!self.key.is_empty() && binds_key(&self.key, row))
            .then(|| hash_row(hasher, &self.key, row))
    }

    /// Returns all stored rows that may be compatible with `probe`.
    pub fn candidates<'table, H: RowHasher<X> + ?Sized>(
        &'table self,
        hasher: &H,
        probe: &Row<X>,
    ) -> impl Iterator<Item = &'table Row<X>> + 'table {
        let keyed = match self.bucket_hash(hasher, probe) {
            Some(hash) => Either::Left(self.buckets.get(&hash).into_iter().flatten()),
            None => Either::Right(self.buckets.values().flatten()),
        };
        keyed.chain(self.no_key_bucket.iter())
    }
}
