//! Common datatypes supporting functions throughout Salesflow

use std::{collections::HashMap, fmt::Display, hash::Hash};

use rust_decimal::Decimal;

/// Identifies a salesperson by document type and document number, e.g. `CC` / `1001`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SalespersonKey {
    pub(crate) doc_type: String,
    pub(crate) doc_number: String,
}

impl SalespersonKey {
    /// Creates a key from a document type and number
    #[must_use]
    pub fn new(doc_type: impl Into<String>, doc_number: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            doc_number: doc_number.into(),
        }
    }

    /// Returns the document type
    #[must_use]
    #[inline]
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Returns the document number
    #[must_use]
    #[inline]
    pub fn doc_number(&self) -> &str {
        &self.doc_number
    }
}

impl Display for SalespersonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.doc_type, self.doc_number)
    }
}

/// Unique identifier for a product
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl From<&str> for ProductId {
    fn from(product_id: &str) -> Self {
        Self(product_id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(product_id: String) -> Self {
        Self(product_id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id[{}]", self.0)
    }
}

/// A salesperson from the reference file, along with their running sales total
#[derive(Debug, Clone, PartialEq)]
pub struct Salesperson {
    pub(crate) key: SalespersonKey,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    /// Sum of quantity × unit price over every resolved sale attributed to this salesperson
    pub(crate) total_sales: Decimal,
}

impl Salesperson {
    /// Creates a salesperson with no sales
    #[must_use]
    pub fn new(
        key: SalespersonKey,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            key,
            first_name: first_name.into(),
            last_name: last_name.into(),
            total_sales: Decimal::ZERO,
        }
    }

    /// Returns the identifying document pair
    #[must_use]
    #[inline]
    pub fn key(&self) -> &SalespersonKey {
        &self.key
    }

    /// Returns `"{first name} {last name}"`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the accumulated sales total
    #[must_use]
    #[inline]
    pub fn total_sales(&self) -> Decimal {
        self.total_sales
    }
}

/// A product from the reference file, along with its running units sold
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub(crate) id: ProductId,
    pub(crate) name: String,
    pub(crate) price: Decimal,
    pub(crate) units_sold: i64,
}

impl Product {
    /// Creates a product with no units sold
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            units_sold: 0,
        }
    }

    /// Returns the product's identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Returns the product's display name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    #[must_use]
    #[inline]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the accumulated number of units sold
    #[must_use]
    #[inline]
    pub fn units_sold(&self) -> i64 {
        self.units_sold
    }

    /// Returns the value of all units sold at the unit price, or `None` if it overflows
    #[must_use]
    pub fn total_sold(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.units_sold))
    }
}

/// Anything that can be stored in a [`ReferenceTable`]
pub trait Keyed {
    /// The lookup key
    type Key: Eq + Hash + Clone + std::fmt::Debug;

    /// Returns the lookup key for this entry
    fn key(&self) -> &Self::Key;
}

impl Keyed for Salesperson {
    type Key = SalespersonKey;

    fn key(&self) -> &SalespersonKey {
        &self.key
    }
}

impl Keyed for Product {
    type Key = ProductId;

    fn key(&self) -> &ProductId {
        &self.id
    }
}

/// Keyed lookup built from a reference file.
///
/// Iteration follows the order in which keys were first inserted. Inserting an entry whose
/// key is already present replaces the old entry in place (last write wins).
///
/// # Limitations
/// No persistence, and no removal.
#[derive(Debug, Clone)]
pub struct ReferenceTable<V: Keyed> {
    /// Entries in first-insertion order
    pub(crate) entries: Vec<V>,
    /// Position of each key in `entries`
    pub(crate) index: HashMap<V::Key, usize>,
}

impl<V: Keyed> Default for ReferenceTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: Keyed> ReferenceTable<V> {
    /// Creates a new, empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the entry it replaced if the key was already present
    pub fn insert(&mut self, entry: V) -> Option<V> {
        if let Some(&position) = self.index.get(entry.key()) {
            return Some(std::mem::replace(&mut self.entries[position], entry));
        }
        self.index.insert(entry.key().clone(), self.entries.len());
        self.entries.push(entry);
        None
    }

    /// Fetches an entry by key, if one exists
    #[must_use]
    pub fn get(&self, key: &V::Key) -> Option<&V> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    /// Fetches an entry by key for mutation, if one exists
    pub fn get_mut(&mut self, key: &V::Key) -> Option<&mut V> {
        self.index
            .get(key)
            .map(|&position| &mut self.entries[position])
    }

    /// Number of distinct keys in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in first-insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.entries.iter()
    }
}

impl<'a, V: Keyed> IntoIterator for &'a ReferenceTable<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<V: Keyed> IntoIterator for ReferenceTable<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Keyed> FromIterator<V> for ReferenceTable<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// Salespeople keyed by document pair
pub type Salespeople = ReferenceTable<Salesperson>;

/// Products keyed by product ID
pub type Catalog = ReferenceTable<Product>;

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: &str, name: &str, price: Decimal) -> Product {
        Product::new(id.into(), name, price)
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(product("P1", "Widget", dec!(10))).is_none());
        assert!(catalog.insert(product("P2", "Gadget", dec!(20))).is_none());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&"P2".into()).unwrap().name(), "Gadget");
        assert!(catalog.get(&"P3".into()).is_none());
    }

    #[test]
    fn test_duplicate_key_overwrites_in_place() {
        let mut catalog = Catalog::new();
        catalog.insert(product("P1", "Widget", dec!(10)));
        catalog.insert(product("P2", "Gadget", dec!(20)));
        let replaced = catalog.insert(product("P1", "Widget v2", dec!(12.5)));
        assert_eq!(replaced.unwrap().name(), "Widget");
        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.iter().map(Product::name).collect();
        assert_eq!(names, vec!["Widget v2", "Gadget"]);
        assert_eq!(catalog.get(&"P1".into()).unwrap().price(), dec!(12.5));
    }

    #[test]
    fn test_salesperson_key_is_the_document_pair() {
        let salespeople: Salespeople = vec![
            Salesperson::new(SalespersonKey::new("CC", "1001"), "Ana", "Ruiz"),
            Salesperson::new(SalespersonKey::new("TI", "1001"), "Luis", "Gomez"),
        ]
        .into_iter()
        .collect();
        assert_eq!(salespeople.len(), 2);
        let found = salespeople.get(&SalespersonKey::new("TI", "1001")).unwrap();
        assert_eq!(found.full_name(), "Luis Gomez");
        assert_eq!(found.total_sales(), Decimal::ZERO);
    }

    #[test]
    fn test_product_total_sold() {
        let mut widget = product("P1", "Widget", dec!(2.50));
        widget.units_sold = 4;
        assert_eq!(widget.total_sold(), Some(dec!(10)));
        widget.price = Decimal::MAX;
        assert_eq!(widget.total_sold(), None);
    }
}
