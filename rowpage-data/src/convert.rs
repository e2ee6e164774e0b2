//! Chainable reshaping of list and page envelopes.
//!
//! Every converter consumes the envelope and returns a new one. On an `Error`
//! the cause is carried over unchanged and no closure, comparator or count
//! supplier is invoked.

use std::cmp::Ordering;
use std::future::Future;

use crate::envelope::Envelope;
use crate::error::DataError;
use crate::page::{Page, Pageable};

impl<T> Envelope<Vec<T>> {
    /// Sort the list in place (stable).
    pub fn sort_by(self, compare: impl FnMut(&T, &T) -> Ordering) -> Self {
        self.map(|mut items| {
            items.sort_by(compare);
            items
        })
    }

    /// Convert each element into another model.
    pub fn map_items<D>(self, f: impl FnMut(T) -> D) -> Envelope<Vec<D>> {
        self.map(|items| items.into_iter().map(f).collect())
    }

    /// Wrap the (already paginated) list into a [`Page`] with a known total.
    pub fn to_page(self, pageable: Pageable, total_elements: u64) -> Envelope<Page<T>> {
        self.map(|items| Page::new(items, pageable, total_elements))
    }

    /// Like [`to_page`](Self::to_page), computing the total only on success.
    pub fn to_page_with(
        self,
        pageable: Pageable,
        total_elements: impl FnOnce() -> u64,
    ) -> Envelope<Page<T>> {
        self.map(|items| Page::new(items, pageable, total_elements()))
    }

    /// Like [`to_page`](Self::to_page), running a deferred count query only on
    /// success. A failed count turns the result into an `Error`.
    pub async fn to_page_counted<F, Fut>(self, pageable: Pageable, count: F) -> Envelope<Page<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Envelope<u64>>,
    {
        match self {
            Envelope::Ok(items) => count()
                .await
                .map(|total| Page::new(items, pageable, total)),
            Envelope::Error(cause) => Envelope::Error(cause),
        }
    }
}

impl<T> Envelope<Page<T>> {
    /// Convert each element of the page, keeping its request and total.
    pub fn map_items<D>(self, f: impl FnMut(T) -> D) -> Envelope<Page<D>> {
        self.map(|page| page.map(f))
    }
}

impl<T> Envelope<Option<Vec<T>>> {
    /// Turn an optional list into a list envelope, failing fast when the
    /// payload is absent.
    pub fn require_present(self) -> Envelope<Vec<T>> {
        self.and_then(|data| match data {
            Some(items) => Envelope::Ok(items),
            None => Envelope::Error(DataError::contract("result data is required but absent")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn failed() -> Envelope<Vec<i32>> {
        Envelope::error(DataError::database(std::io::Error::other("down")))
    }

    #[test]
    fn sort_and_map() {
        let env = Envelope::ok(vec![3, 1, 2])
            .sort_by(|a, b| a.cmp(b))
            .map_items(|n| n.to_string());
        assert_eq!(env.data().unwrap(), &["1", "2", "3"]);
    }

    #[test]
    fn error_short_circuits_without_calling_closures() {
        let env = failed()
            .sort_by(|_, _| panic!("comparator must not run"))
            .map_items(|_: i32| -> String { panic!("mapper must not run") });
        assert!(matches!(env.cause(), Some(DataError::Database(e)) if e.to_string() == "down"));

        let page = failed().to_page_with(Pageable::default(), || panic!("count must not run"));
        assert!(page.is_error());
    }

    #[test]
    fn to_page_keeps_total() {
        let pageable = Pageable::new(1, 2).unwrap();
        let page = Envelope::ok(vec!["c", "d"])
            .to_page(pageable.clone(), 9)
            .into_result()
            .unwrap();
        assert!(page.content().len() as u64 <= pageable.size());
        assert_eq!(page.total_elements(), 9);
        assert_eq!(page.pageable(), &pageable);
    }

    #[test]
    fn to_page_with_calls_supplier_once() {
        let calls = Cell::new(0);
        let page = Envelope::ok(vec![1])
            .to_page_with(Pageable::default(), || {
                calls.set(calls.get() + 1);
                1
            })
            .map_items(|n| n * 2);
        assert_eq!(calls.get(), 1);
        assert_eq!(page.data().unwrap().content(), &[2]);
    }

    #[tokio::test]
    async fn counted_page() {
        let page = Envelope::ok(vec![1, 2])
            .to_page_counted(Pageable::new(0, 2).unwrap(), || async { Envelope::ok(5) })
            .await;
        assert_eq!(page.data().unwrap().total_elements(), 5);

        let counted = Cell::new(false);
        let page = failed()
            .to_page_counted(Pageable::default(), || {
                counted.set(true);
                async { Envelope::ok(0) }
            })
            .await;
        assert!(page.is_error());
        assert!(!counted.get());

        let page = Envelope::ok(vec![1])
            .to_page_counted(Pageable::default(), || async {
                Envelope::error(DataError::contract("count failed"))
            })
            .await;
        assert!(matches!(page.cause(), Some(DataError::Contract(_))));
    }

    #[test]
    fn require_present() {
        let env: Envelope<Option<Vec<i32>>> = Envelope::ok(None);
        assert!(matches!(env.require_present().cause(), Some(DataError::Contract(_))));
        let env = Envelope::ok(Some(vec![1]));
        assert_eq!(env.require_present().data(), Some(&vec![1]));
    }
}
