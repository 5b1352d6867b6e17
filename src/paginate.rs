//! Page arithmetic shared by the chronological feed, the tag feeds, and the
//! per-post navigation. Everything here is pure: the same inputs always yield
//! the same [`Page`] sequence.

use std::fmt;

/// One page-worth of a larger ordered collection. `index` is 1-based;
/// `offset` and `length` describe the slice of the collection that belongs to
/// the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub offset: usize,
    pub length: usize,
}

impl Page {
    /// The half-open range of collection indices covered by this page.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Returns the number of pages needed for `total_items` items. An empty
/// collection still occupies a single (empty) page.
pub fn total_pages(total_items: usize, page_size: usize) -> Result<usize> {
    check_page_size(page_size)?;
    Ok(match total_items {
        0 => 1,
        n => (n + page_size - 1) / page_size,
    })
}

/// Splits `total_items` items into pages of `page_size`. The final page holds
/// the remainder; when `total_items` is zero, a single page of length zero is
/// returned so that an empty feed still renders its shell.
pub fn paginate(total_items: usize, page_size: usize) -> Result<Vec<Page>> {
    let pages = total_pages(total_items, page_size)?;
    Ok((0..pages)
        .map(|i| {
            let offset = i * page_size;
            Page {
                index: i + 1,
                offset,
                length: std::cmp::min(page_size, total_items - offset),
            }
        })
        .collect())
}

/// Rejects a page size of zero. Used when loading configuration so a bad
/// value fails before any content is read.
pub fn check_page_size(page_size: usize) -> Result<()> {
    match page_size {
        0 => Err(InvalidArgument { page_size }),
        _ => Ok(()),
    }
}

type Result<T> = std::result::Result<T, InvalidArgument>;

/// Returned when a page size is not positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArgument {
    pub page_size: usize,
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid page size {}: page size must be positive",
            self.page_size
        )
    }
}

impl std::error::Error for InvalidArgument {}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_paginate_twenty_by_nine() -> Result<()> {
        let pages = paginate(20, 9)?;
        assert_eq!(
            vec![9, 9, 2],
            pages.iter().map(|p| p.length).collect::<Vec<_>>()
        );
        assert_eq!(
            vec![0, 9, 18],
            pages.iter().map(|p| p.offset).collect::<Vec<_>>()
        );
        assert_eq!(vec![1, 2, 3], pages.iter().map(|p| p.index).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_paginate_empty_yields_single_empty_page() -> Result<()> {
        assert_eq!(
            vec![Page {
                index: 1,
                offset: 0,
                length: 0
            }],
            paginate(0, 9)?
        );
        assert_eq!(1, total_pages(0, 9)?);
        Ok(())
    }

    #[test]
    fn test_paginate_exact_multiple() -> Result<()> {
        let pages = paginate(18, 9)?;
        assert_eq!(2, pages.len());
        assert_eq!(9, pages[1].length);
        Ok(())
    }

    #[test]
    fn test_paginate_zero_page_size() {
        assert_eq!(Err(InvalidArgument { page_size: 0 }), paginate(5, 0));
        assert_eq!(Err(InvalidArgument { page_size: 0 }), paginate(0, 0));
        assert!(check_page_size(0).is_err());
    }

    proptest! {
        #[test]
        fn test_paginate_covers_every_item(total in 0usize..500, size in 1usize..50) {
            let pages = paginate(total, size).unwrap();

            prop_assert_eq!(pages.iter().map(|p| p.length).sum::<usize>(), total);
            prop_assert_eq!(pages.len(), std::cmp::max(1, (total + size - 1) / size));
            prop_assert_eq!(pages.len(), total_pages(total, size).unwrap());

            let mut next = 0;
            for (i, page) in pages.iter().enumerate() {
                prop_assert_eq!(page.index, i + 1);
                prop_assert_eq!(page.offset, next);
                prop_assert_eq!(page.offset, (page.index - 1) * size);
                prop_assert!(page.length <= size);
                next = page.range().end;
            }
            prop_assert_eq!(next, total);
        }

        #[test]
        fn test_paginate_is_deterministic(total in 0usize..500, size in 1usize..50) {
            prop_assert_eq!(paginate(total, size).unwrap(), paginate(total, size).unwrap());
        }
    }
}
