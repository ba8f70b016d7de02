//! Joins feed listings with status rows by VIN.

use crate::inventory::{InventoryItem, Listing, StatusTable};

/// Joins each listing with its status row.
///
/// Listings without a row are dropped. Output keeps the feed's order.
pub fn merge(listings: Vec<Listing>, table: &StatusTable) -> Vec<InventoryItem> {
    listings
        .into_iter()
        .filter_map(|listing| {
            let status = table.get(&listing.vin)?.clone();
            Some(InventoryItem::new(listing, status))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::StatusRecord;

    fn listing(vin: &str) -> Listing {
        Listing {
            vin: vin.to_string(),
            ..Listing::default()
        }
    }

    fn row(status: &str) -> StatusRecord {
        StatusRecord {
            status: status.to_string(),
            ..StatusRecord::default()
        }
    }

    #[test]
    fn test_unmatched_listings_dropped_in_order() {
        let table: StatusTable = [("A".to_string(), row("AVAILABLE")), ("C".to_string(), row("SOLD"))]
            .into_iter()
            .collect();

        let merged = merge(vec![listing("A"), listing("B"), listing("C")], &table);

        let vins: Vec<&str> = merged.iter().map(|item| item.vin()).collect();
        assert_eq!(vins, vec!["A", "C"]);
        assert_eq!(merged[1].status(), "SOLD");
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let merged = merge(vec![listing("A"), listing("B")], &StatusTable::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn test_empty_feed_yields_nothing() {
        let table: StatusTable = [("A".to_string(), row("AVAILABLE"))].into_iter().collect();
        assert!(merge(Vec::new(), &table).is_empty());
    }
}
