use rust_decimal::Decimal;

use crate::{
    records::SaleLine,
    types::{Catalog, Product, Salesperson, SalespersonKey, Salespeople},
};

impl Salesperson {
    /// Returns the running total after a sale worth `amount`, or `None` on overflow
    fn total_after(&self, amount: Decimal) -> Option<Decimal> {
        self.total_sales.checked_add(amount)
    }
}

impl Product {
    /// Returns the units sold after selling `quantity` more, along with the value of that
    /// sale, or `None` if either overflows
    fn tally(&self, quantity: i64) -> Option<(i64, Decimal)> {
        let units_sold = self.units_sold.checked_add(quantity)?;
        let amount = self.price.checked_mul(Decimal::from(quantity))?;
        Some((units_sold, amount))
    }
}

/// What happened when a single sale line was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleOutcome {
    /// Both the product and the salesperson were credited
    Credited,
    /// The product was credited; the header's salesperson is unknown
    ProductOnly,
    /// The product ID is unknown, so nothing was credited
    UnknownProduct,
    /// A running total would overflow, so nothing was credited
    Overflow,
}

/// Applies one sale line to the reference tables.
///
/// The product's unit count always grows when the product resolves. The salesperson's total
/// grows by `quantity × price` only when `salesperson` is given and resolves too. Either both
/// sides are updated or neither is.
pub(crate) fn apply_sale(
    catalog: &mut Catalog,
    salespeople: &mut Salespeople,
    salesperson: Option<&SalespersonKey>,
    sale: &SaleLine,
) -> SaleOutcome {
    let Some(product) = catalog.get_mut(&sale.product_id) else {
        return SaleOutcome::UnknownProduct;
    };
    let Some((units_sold, amount)) = product.tally(sale.quantity) else {
        return SaleOutcome::Overflow;
    };
    let salesperson = salesperson.and_then(|key| salespeople.get_mut(key));
    let total_sales = match salesperson.as_deref().map(|s| s.total_after(amount)) {
        Some(None) => return SaleOutcome::Overflow,
        Some(Some(total)) => Some(total),
        None => None,
    };

    product.units_sold = units_sold;
    match (salesperson, total_sales) {
        (Some(salesperson), Some(total)) => {
            salesperson.total_sales = total;
            SaleOutcome::Credited
        }
        _ => SaleOutcome::ProductOnly,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn tables() -> (Catalog, Salespeople) {
        let catalog = vec![
            Product::new("P1".into(), "Widget", dec!(10.00)),
            Product::new("P2".into(), "Gadget", dec!(20.00)),
        ]
        .into_iter()
        .collect();
        let salespeople = vec![Salesperson::new(
            SalespersonKey::new("CC", "1001"),
            "Ana",
            "Ruiz",
        )]
        .into_iter()
        .collect();
        (catalog, salespeople)
    }

    fn sale(product_id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.into(),
            quantity,
        }
    }

    #[test]
    fn test_tally() {
        let mut product = Product::new("P9".into(), "Thing", dec!(2.25));
        product.units_sold = 1;
        assert_eq!(product.tally(4), Some((5, dec!(9.00))));
        assert_eq!(product.tally(i64::MAX), None);
    }

    #[test]
    fn test_total_after() {
        let mut salesperson = Salesperson::new(SalespersonKey::new("CC", "7"), "Eva", "Paz");
        salesperson.total_sales = dec!(12.5);
        assert_eq!(salesperson.total_after(dec!(0.25)), Some(dec!(12.75)));
        assert_eq!(salesperson.total_after(Decimal::MAX), None);
    }

    #[test]
    fn test_apply_credits_both_sides() {
        let (mut catalog, mut salespeople) = tables();
        let ana = SalespersonKey::new("CC", "1001");
        let outcome = apply_sale(&mut catalog, &mut salespeople, Some(&ana), &sale("P1", 2));
        assert_eq!(outcome, SaleOutcome::Credited);
        apply_sale(&mut catalog, &mut salespeople, Some(&ana), &sale("P2", 1));
        assert_eq!(catalog.get(&"P1".into()).unwrap().units_sold(), 2);
        assert_eq!(catalog.get(&"P2".into()).unwrap().units_sold(), 1);
        assert_eq!(salespeople.get(&ana).unwrap().total_sales(), dec!(40.00));
    }

    #[test]
    fn test_unknown_salesperson_still_counts_units() {
        let (mut catalog, mut salespeople) = tables();
        let stranger = SalespersonKey::new("CC", "9999");
        let outcome = apply_sale(
            &mut catalog,
            &mut salespeople,
            Some(&stranger),
            &sale("P1", 3),
        );
        assert_eq!(outcome, SaleOutcome::ProductOnly);
        assert_eq!(catalog.get(&"P1".into()).unwrap().units_sold(), 3);
        let ana = salespeople.get(&SalespersonKey::new("CC", "1001")).unwrap();
        assert_eq!(ana.total_sales(), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_product_changes_nothing() {
        let (mut catalog, mut salespeople) = tables();
        let ana = SalespersonKey::new("CC", "1001");
        let outcome = apply_sale(&mut catalog, &mut salespeople, Some(&ana), &sale("P404", 5));
        assert_eq!(outcome, SaleOutcome::UnknownProduct);
        assert!(catalog.iter().all(|product| product.units_sold() == 0));
        assert_eq!(salespeople.get(&ana).unwrap().total_sales(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_changes_nothing() {
        let (mut catalog, mut salespeople) = tables();
        let ana = SalespersonKey::new("CC", "1001");
        salespeople.get_mut(&ana).unwrap().total_sales = Decimal::MAX;
        let outcome = apply_sale(&mut catalog, &mut salespeople, Some(&ana), &sale("P1", 1));
        assert_eq!(outcome, SaleOutcome::Overflow);
        assert_eq!(catalog.get(&"P1".into()).unwrap().units_sold(), 0);
        assert_eq!(salespeople.get(&ana).unwrap().total_sales(), Decimal::MAX);

        let outcome = apply_sale(
            &mut catalog,
            &mut salespeople,
            Some(&ana),
            &sale("P2", i64::MAX),
        );
        assert_eq!(outcome, SaleOutcome::Overflow);
        assert_eq!(catalog.get(&"P2".into()).unwrap().units_sold(), 0);
    }
}
