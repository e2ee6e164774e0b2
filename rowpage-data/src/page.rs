use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// Sort direction of a single [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One `column direction` entry of an `ORDER BY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Order {
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }
}

/// Ordered list of sort columns. Column names must come from a trusted list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(Vec<Order>);

impl Sort {
    pub fn unsorted() -> Self {
        Self(Vec::new())
    }

    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Self(orders.into_iter().collect())
    }

    pub fn and(mut self, order: Order) -> Self {
        self.0.push(order);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.0
    }
}

/// A page request: which slice of an ordered result set to return.
///
/// Always holds a positive size and a window end that fits in `u64`, so
/// offsets computed from it never overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageable")]
pub struct Pageable {
    page: u64,
    size: u64,
    #[serde(skip_serializing_if = "Sort::is_empty")]
    sort: Sort,
}

#[derive(Deserialize)]
struct RawPageable {
    #[serde(default)]
    page: u64,
    #[serde(default = "default_page_size")]
    size: u64,
    #[serde(default)]
    sort: Sort,
}

fn default_page_size() -> u64 {
    20
}

impl TryFrom<RawPageable> for Pageable {
    type Error = DataError;

    fn try_from(raw: RawPageable) -> Result<Self, Self::Error> {
        Pageable::new(raw.page, raw.size).map(|p| p.with_sort(raw.sort))
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
            sort: Sort::unsorted(),
        }
    }
}

impl Pageable {
    /// Create an unsorted page request. `page` is 0-based.
    pub fn new(page: u64, size: u64) -> Result<Self, DataError> {
        if size == 0 {
            return Err(DataError::contract("page size must be greater than zero"));
        }
        if page
            .checked_add(1)
            .and_then(|next| next.checked_mul(size))
            .is_none()
        {
            return Err(DataError::contract(format!(
                "page {page} with size {size} overflows the row window"
            )));
        }
        Ok(Self {
            page,
            size,
            sort: Sort::unsorted(),
        })
    }

    /// Create a sorted page request.
    pub fn sorted(page: u64, size: u64, sort: Sort) -> Result<Self, DataError> {
        Self::new(page, size).map(|p| p.with_sort(sort))
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        self.page * self.size
    }

    /// Exclusive end of the row window, `(page + 1) * size`.
    pub fn end(&self) -> u64 {
        (self.page + 1) * self.size
    }

    pub fn next(&self) -> Option<Self> {
        Self::new(self.page.checked_add(1)?, self.size)
            .ok()
            .map(|p| p.with_sort(self.sort.clone()))
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    pageable: Pageable,
    total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: Pageable, total_elements: u64) -> Self {
        Self {
            content,
            pageable,
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    pub fn number(&self) -> u64 {
        self.pageable.page()
    }

    pub fn size(&self) -> u64 {
        self.pageable.size()
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(self.pageable.size())
    }

    pub fn is_first(&self) -> bool {
        self.pageable.page() == 0
    }

    pub fn has_next(&self) -> bool {
        self.pageable.page() + 1 < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Map the content into a new page with the same request and total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            pageable: self.pageable,
            total_elements: self.total_elements,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Page", 5)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("page", &self.number())?;
        state.serialize_field("size", &self.size())?;
        state.serialize_field("total_elements", &self.total_elements)?;
        state.serialize_field("total_pages", &self.total_pages())?;
        state.end()
    }
}
