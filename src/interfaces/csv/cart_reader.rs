use crate::domain::cart::{CartItem, CartSnapshot};
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads cart lines from a CSV source with a `product_id,quantity,unit_price` header.
///
/// Whitespace is trimmed and record lengths are flexible, so hand-edited files work.
pub struct CartReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartReader<R> {
    /// Creates a new `CartReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes cart lines; each malformed row yields its own error.
    pub fn items(self) -> impl Iterator<Item = Result<CartItem>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }

    /// Collects valid rows, handing every malformed one to `on_error`.
    pub fn read_cart(self, mut on_error: impl FnMut(CheckoutError)) -> CartSnapshot {
        let mut items = Vec::new();
        for item in self.items() {
            match item {
                Ok(item) => items.push(item),
                Err(e) => on_error(e),
            }
        }
        CartSnapshot::new(items)
    }
}
