//! Stock consumption checker
//!
//! Compares the consumables an action requires against the stock on hand.
//! Matching is exact case-insensitive equality on the (name, unit) pair; no
//! fuzzy matching. Everything here is a pure proposal — nothing is
//! persisted. The caller applies the proposal inside one database
//! transaction, creating stock rows for never-seen consumable names before
//! decrementing quantities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Consumable, Stock};

/// A consumable requirement that stock cannot (fully) cover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingItem {
    pub name: String,
    pub unit: String,
    pub required_quantity: Decimal,
    /// Stock on hand at check time (zero when no row matched)
    pub available_quantity: Decimal,
    pub missing_quantity: Decimal,
}

/// Proposed new quantity for an existing stock row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub stock_id: Uuid,
    /// May be negative: a partial shortfall, not an error
    pub new_quantity: Decimal,
}

/// A required consumable with no matching stock row at all; the caller
/// creates the row (zero stock, flagged out of stock) before decrementing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedConsumable {
    pub name: String,
    pub unit: String,
    pub required_quantity: Decimal,
}

/// Full consumption proposal for one action's consumables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConsumption {
    pub updates: Vec<StockUpdate>,
    pub unmatched: Vec<UnmatchedConsumable>,
    pub out_of_stock: Vec<MissingItem>,
}

fn matches(stock: &Stock, consumable: &Consumable) -> bool {
    stock.name.eq_ignore_ascii_case(&consumable.name)
        && stock.unit.eq_ignore_ascii_case(&consumable.unit)
}

fn find_stock<'a>(stocks: &'a [Stock], consumable: &Consumable) -> Option<&'a Stock> {
    stocks.iter().find(|s| matches(s, consumable))
}

/// True iff every consumable finds a matching stock row holding at least
/// the required quantity. An empty consumable list is trivially in stock.
pub fn check_consumables_in_stock(consumables: &[Consumable], stocks: &[Stock]) -> bool {
    consumables.iter().all(|c| {
        find_stock(stocks, c)
            .map(|s| s.quantity >= c.quantity)
            .unwrap_or(false)
    })
}

/// Shortfall report: one entry per consumable the stock cannot fully cover
pub fn get_missing_consumables(consumables: &[Consumable], stocks: &[Stock]) -> Vec<MissingItem> {
    consumables
        .iter()
        .filter_map(|c| {
            let available = find_stock(stocks, c)
                .map(|s| s.quantity)
                .unwrap_or(Decimal::ZERO);
            if available >= c.quantity {
                None
            } else {
                Some(MissingItem {
                    name: c.name.clone(),
                    unit: c.unit.clone(),
                    required_quantity: c.quantity,
                    available_quantity: available,
                    missing_quantity: c.quantity - available,
                })
            }
        })
        .collect()
}

/// Compute the consumption proposal for a set of consumables.
///
/// Matched stock rows get `new_quantity = quantity − required`, which may
/// go negative to record a partial shortfall; a negative remainder also
/// produces an out-of-stock entry with `missing = |remainder|`. Consumables
/// with no matching row at all report their full requirement as missing and
/// appear in `unmatched` so the caller can create the row first.
pub fn calculate_stock_consumption(
    consumables: &[Consumable],
    stocks: &[Stock],
) -> StockConsumption {
    let mut updates = Vec::new();
    let mut unmatched = Vec::new();
    let mut out_of_stock = Vec::new();

    for consumable in consumables {
        match find_stock(stocks, consumable) {
            Some(stock) => {
                let new_quantity = stock.quantity - consumable.quantity;
                updates.push(StockUpdate {
                    stock_id: stock.id,
                    new_quantity,
                });
                if new_quantity < Decimal::ZERO {
                    out_of_stock.push(MissingItem {
                        name: consumable.name.clone(),
                        unit: consumable.unit.clone(),
                        required_quantity: consumable.quantity,
                        available_quantity: stock.quantity,
                        missing_quantity: new_quantity.abs(),
                    });
                }
            }
            None => {
                unmatched.push(UnmatchedConsumable {
                    name: consumable.name.clone(),
                    unit: consumable.unit.clone(),
                    required_quantity: consumable.quantity,
                });
                out_of_stock.push(MissingItem {
                    name: consumable.name.clone(),
                    unit: consumable.unit.clone(),
                    required_quantity: consumable.quantity,
                    available_quantity: Decimal::ZERO,
                    missing_quantity: consumable.quantity,
                });
            }
        }
    }

    StockConsumption {
        updates,
        unmatched,
        out_of_stock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommodityType;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn consumable(name: &str, unit: &str, quantity: &str) -> Consumable {
        Consumable {
            id: Uuid::new_v4(),
            action_id: Uuid::new_v4(),
            name: name.to_string(),
            unit: unit.to_string(),
            quantity: dec(quantity),
            original_quantity: None,
            commodity: CommodityType::Additive,
        }
    }

    fn stock(name: &str, unit: &str, quantity: &str) -> Stock {
        Stock {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            unit: unit.to_string(),
            quantity: dec(quantity),
            minimum_qty: dec("5"),
            is_out_of_stock: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_consumable_list_is_trivially_in_stock() {
        assert!(check_consumables_in_stock(&[], &[stock("SO2", "g", "10")]));
    }

    #[test]
    fn matching_is_case_insensitive_on_name_and_unit() {
        let consumables = vec![consumable("SO2", "g", "50")];
        let stocks = vec![stock("so2", "G", "30")];

        assert!(!check_consumables_in_stock(&consumables, &stocks));

        let missing = get_missing_consumables(&consumables, &stocks);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].available_quantity, dec("30"));
        assert_eq!(missing[0].missing_quantity, dec("20"));
    }

    #[test]
    fn sufficient_stock_passes_the_check() {
        let consumables = vec![
            consumable("SO2", "g", "50"),
            consumable("Bentonite", "kg", "2"),
        ];
        let stocks = vec![stock("SO2", "g", "50"), stock("bentonite", "kg", "10")];

        assert!(check_consumables_in_stock(&consumables, &stocks));
        assert!(get_missing_consumables(&consumables, &stocks).is_empty());
    }

    #[test]
    fn unit_mismatch_is_not_a_match() {
        let consumables = vec![consumable("SO2", "g", "10")];
        let stocks = vec![stock("SO2", "kg", "10")];

        assert!(!check_consumables_in_stock(&consumables, &stocks));
    }

    #[test]
    fn consumption_may_drive_stock_negative() {
        let consumables = vec![consumable("SO2", "g", "50")];
        let stocks = vec![stock("SO2", "g", "30")];

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        assert_eq!(proposal.updates.len(), 1);
        assert_eq!(proposal.updates[0].new_quantity, dec("-20"));
        assert_eq!(proposal.out_of_stock.len(), 1);
        assert_eq!(proposal.out_of_stock[0].missing_quantity, dec("20"));
        assert!(proposal.unmatched.is_empty());
    }

    #[test]
    fn unmatched_consumable_reports_full_requirement() {
        let consumables = vec![consumable("Levures", "g", "500")];
        let proposal = calculate_stock_consumption(&consumables, &[]);

        assert!(proposal.updates.is_empty());
        assert_eq!(proposal.unmatched.len(), 1);
        assert_eq!(proposal.unmatched[0].required_quantity, dec("500"));
        assert_eq!(proposal.out_of_stock[0].available_quantity, Decimal::ZERO);
        assert_eq!(proposal.out_of_stock[0].missing_quantity, dec("500"));
    }

    #[test]
    fn exact_consumption_leaves_zero_without_shortfall() {
        let consumables = vec![consumable("SO2", "g", "30")];
        let stocks = vec![stock("SO2", "g", "30")];

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        assert_eq!(proposal.updates[0].new_quantity, Decimal::ZERO);
        assert!(proposal.out_of_stock.is_empty());
    }
}
