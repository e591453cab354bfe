//! Order-preserving grouping of flat records by key

use std::collections::HashMap;
use std::hash::Hash;

/// Records grouped by key.
///
/// Keys keep the order in which they were first seen, and records keep
/// their input order within each group.
#[derive(Debug, Clone)]
pub struct Groups<K, T> {
    entries: Vec<(K, Vec<T>)>,
    index: HashMap<K, usize>,
}

impl<K, T> Groups<K, T>
where
    K: Eq + Hash + Clone,
{
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&[T]> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[T])> {
        self.entries
            .iter()
            .map(|(key, members)| (key, members.as_slice()))
    }

    pub fn into_vec(self) -> Vec<(K, Vec<T>)> {
        self.entries
    }
}

impl<K, T> IntoIterator for Groups<K, T> {
    type Item = (K, Vec<T>);
    type IntoIter = std::vec::IntoIter<(K, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Group `records` by the key returned from `key_fn`
pub fn group_by<T, K, I, F>(records: I, mut key_fn: F) -> Groups<K, T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> K,
    K: Eq + Hash + Clone,
{
    let mut entries: Vec<(K, Vec<T>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for record in records {
        let key = key_fn(&record);
        match index.get(&key) {
            Some(&position) => entries[position].1.push(record),
            None => {
                index.insert(key.clone(), entries.len());
                entries.push((key, vec![record]));
            }
        }
    }

    Groups { entries, index }
}
