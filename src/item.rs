//! Items, item predicates, and loot container contents.

/// Stable name identifier for an item. Declared loot item sets are static
/// data, so identifiers are interned string literals.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ItemId(pub &'static str);

impl ItemId {
    pub fn name(self) -> &'static str {
        self.0
    }
}

/// Well-known item identifiers.
pub mod items {
    use super::ItemId;

    pub const GOLDEN_APPLE: ItemId = ItemId("golden_apple");
    pub const ENCHANTED_GOLDEN_APPLE: ItemId = ItemId("enchanted_golden_apple");
    pub const DIAMOND: ItemId = ItemId("diamond");
    pub const EMERALD: ItemId = ItemId("emerald");
    pub const IRON_INGOT: ItemId = ItemId("iron_ingot");
    pub const GOLD_INGOT: ItemId = ItemId("gold_ingot");
    pub const HEART_OF_THE_SEA: ItemId = ItemId("heart_of_the_sea");
    pub const PRISMARINE_CRYSTALS: ItemId = ItemId("prismarine_crystals");
    pub const TNT: ItemId = ItemId("tnt");
}

/// Predicate matching a single item identifier.
pub fn is(id: ItemId) -> impl Fn(ItemId) -> bool + Copy + Send + Sync {
    move |item| item == id
}

/// Predicate matching any of a set of item identifiers.
pub fn any_of(ids: &'static [ItemId]) -> impl Fn(ItemId) -> bool + Copy + Send + Sync {
    move |item| ids.contains(&item)
}

/// A stack of identical items inside a loot container.
#[derive(Clone, Copy, Debug)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemId, count: u32) -> ItemStack {
        ItemStack { item, count }
    }
}

/// The rolled contents of one loot container at a structure.
#[derive(Clone, Debug, Default)]
pub struct ChestLoot {
    pub items: Vec<ItemStack>,
}

impl ChestLoot {
    pub fn new(items: Vec<ItemStack>) -> ChestLoot {
        ChestLoot { items }
    }

    /// Total count of items in this container satisfying the predicate.
    pub fn count_matching<P>(&self, predicate: &P) -> u32
    where
        P: Fn(ItemId) -> bool,
    {
        self.items
            .iter()
            .filter(|stack| predicate(stack.item))
            .map(|stack| stack.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::items::*;
    use super::*;

    #[test]
    fn count_matching_sums_across_stacks() {
        let chest = ChestLoot::new(vec![
            ItemStack::new(GOLDEN_APPLE, 2),
            ItemStack::new(TNT, 3),
            ItemStack::new(GOLDEN_APPLE, 1),
        ]);
        assert_eq!(chest.count_matching(&is(GOLDEN_APPLE)), 3);
        assert_eq!(chest.count_matching(&is(DIAMOND)), 0);
    }

    #[test]
    fn any_of_matches_multiple_identifiers() {
        let pred = any_of(&[GOLDEN_APPLE, ENCHANTED_GOLDEN_APPLE]);
        assert!(pred(GOLDEN_APPLE));
        assert!(pred(ENCHANTED_GOLDEN_APPLE));
        assert!(!pred(IRON_INGOT));
    }
}
