//! Warehouse inventory: one line per [`Category`].
//!
//! Fields are private so the two invariants hold by construction: stock
//! stays within `0..=MAX_STOCK`, and `warning` is recomputed on every stock
//! change.

use stockpile_types::{Category, ItemSnapshot};

use crate::rules::{self, INITIAL_STOCK, MAX_STOCK, OPTIMAL_STOCK};

/// Clamp a signed stock figure into `0..=MAX_STOCK`.
pub(crate) fn clamp_stock(value: i64) -> u32 {
    let bounded = value.clamp(0, i64::from(MAX_STOCK));
    u32::try_from(bounded).unwrap_or(MAX_STOCK)
}

/// Before/after stock levels for a single adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    /// Stock before the change.
    pub previous: u32,
    /// Stock after clamping.
    pub current: u32,
    /// Target level the change is judged against.
    pub optimal: u32,
}

impl StockChange {
    /// Whether the change moved stock strictly closer to optimal.
    pub const fn moved_closer(&self) -> bool {
        self.current.abs_diff(self.optimal) < self.previous.abs_diff(self.optimal)
    }
}

/// Stock level, demand, and target for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryItem {
    stock: u32,
    demand: u32,
    optimal: u32,
    warning: bool,
}

impl InventoryItem {
    /// A freshly stocked line for `category`.
    pub const fn new(category: Category) -> Self {
        Self {
            stock: INITIAL_STOCK,
            demand: rules::base_demand(category),
            optimal: OPTIMAL_STOCK,
            warning: false,
        }
    }

    /// Units on hand.
    pub const fn stock(&self) -> u32 {
        self.stock
    }

    /// Base daily demand.
    pub const fn demand(&self) -> u32 {
        self.demand
    }

    /// Target stock level.
    pub const fn optimal(&self) -> u32 {
        self.optimal
    }

    /// Whether the line is under- or over-stocked.
    pub const fn warning(&self) -> bool {
        self.warning
    }

    /// Whether stock is above the overstock threshold.
    pub const fn is_overstocked(&self) -> bool {
        rules::is_overstocked(self.stock, self.optimal)
    }

    /// Replace the stock level, clamping to capacity and refreshing `warning`.
    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock.min(MAX_STOCK);
        self.warning = rules::is_warning(self.stock, self.demand, self.optimal);
    }

    /// Add `amount` (possibly negative) to stock, clamped to `0..=MAX_STOCK`.
    pub fn adjust(&mut self, amount: i32) -> StockChange {
        let previous = self.stock;
        let target = i64::from(previous).saturating_add(i64::from(amount));
        self.set_stock(clamp_stock(target));
        StockChange {
            previous,
            current: self.stock,
            optimal: self.optimal,
        }
    }

    /// Read-only view for snapshots.
    pub fn snapshot(&self) -> ItemSnapshot {
        let fill_percent = self
            .stock
            .saturating_mul(100)
            .checked_div(MAX_STOCK)
            .unwrap_or(0);
        ItemSnapshot {
            stock: self.stock,
            demand: self.demand,
            optimal: self.optimal,
            warning: self.warning,
            fill_percent,
        }
    }
}

/// The fixed set of inventory lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    electronics: InventoryItem,
    apparel: InventoryItem,
    accessories: InventoryItem,
}

impl Inventory {
    /// Every line at its starting stock.
    pub const fn new() -> Self {
        Self {
            electronics: InventoryItem::new(Category::Electronics),
            apparel: InventoryItem::new(Category::Apparel),
            accessories: InventoryItem::new(Category::Accessories),
        }
    }

    /// The line for `category`.
    pub const fn item(&self, category: Category) -> &InventoryItem {
        match category {
            Category::Electronics => &self.electronics,
            Category::Apparel => &self.apparel,
            Category::Accessories => &self.accessories,
        }
    }

    /// Mutable access to the line for `category`.
    pub const fn item_mut(&mut self, category: Category) -> &mut InventoryItem {
        match category {
            Category::Electronics => &mut self.electronics,
            Category::Apparel => &mut self.apparel,
            Category::Accessories => &mut self.accessories,
        }
    }

    /// Lines in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &InventoryItem)> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.item(category)))
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lines_match_category_demand() {
        let inventory = Inventory::new();
        let electronics = inventory.item(Category::Electronics);
        assert_eq!(electronics.stock(), 50);
        assert_eq!(electronics.demand(), 10);
        assert_eq!(electronics.optimal(), 50);
        assert!(!electronics.warning());
        assert_eq!(inventory.item(Category::Apparel).demand(), 8);
        assert_eq!(inventory.item(Category::Accessories).demand(), 15);
    }

    #[test]
    fn adjust_clamps_at_capacity() {
        let mut item = InventoryItem::new(Category::Electronics);
        let change = item.adjust(60);
        assert_eq!(change.previous, 50);
        assert_eq!(change.current, 100);
        assert!(item.warning());
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let mut item = InventoryItem::new(Category::Apparel);
        let change = item.adjust(-500);
        assert_eq!(change.current, 0);
        assert!(item.warning());
    }

    #[test]
    fn extreme_amounts_do_not_overflow() {
        let mut item = InventoryItem::new(Category::Apparel);
        assert_eq!(item.adjust(i32::MAX).current, MAX_STOCK);
        assert_eq!(item.adjust(i32::MIN).current, 0);
    }

    #[test]
    fn moved_closer_is_strict() {
        let away = StockChange {
            previous: 50,
            current: 40,
            optimal: 50,
        };
        assert!(!away.moved_closer());

        let toward = StockChange {
            previous: 40,
            current: 45,
            optimal: 50,
        };
        assert!(toward.moved_closer());

        // 45 -> 55 keeps the same distance.
        let across = StockChange {
            previous: 45,
            current: 55,
            optimal: 50,
        };
        assert!(!across.moved_closer());
    }

    #[test]
    fn warning_recomputed_on_every_set() {
        let mut item = InventoryItem::new(Category::Accessories);
        item.set_stock(20);
        assert!(item.warning());
        item.set_stock(40);
        assert!(!item.warning());
        item.set_stock(80);
        assert!(item.warning());
    }

    #[test]
    fn snapshot_reports_fill_percent() {
        let mut item = InventoryItem::new(Category::Electronics);
        item.set_stock(35);
        let view = item.snapshot();
        assert_eq!(view.stock, 35);
        assert_eq!(view.fill_percent, 35);
    }

    #[test]
    fn iteration_follows_processing_order() {
        let inventory = Inventory::new();
        let order: Vec<Category> = inventory.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }
}
