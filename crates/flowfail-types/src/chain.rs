//! Walking cause chains of arbitrary errors.

use std::{collections::BTreeMap, error::Error, iter::FusedIterator};

use crate::{data_of, Data};

/// Iterator over an error and its successive `source()`s, outermost first.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Chain<'a> {
    pub fn new(head: &'a (dyn Error + 'static)) -> Self {
        Self { next: Some(head) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

/// The innermost error of the chain; `err` itself when it has no source.
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    Chain::new(err).last().unwrap_or(err)
}

/// Payloads of every structured failure in the chain, outermost first.
pub fn collect_data<'a>(err: &'a (dyn Error + 'static)) -> Vec<&'a Data> {
    Chain::new(err).filter_map(data_of).collect()
}

/// Union of all payloads in the chain. On key conflicts the outer failure wins.
pub fn merged_data(err: &(dyn Error + 'static)) -> Data {
    let mut merged = BTreeMap::new();
    for data in collect_data(err) {
        for (key, value) in data {
            merged
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
    Data::from(merged)
}
