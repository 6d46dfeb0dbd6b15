//! [`FoodItem`]-related read definitions.

use std::collections::HashMap;

use crate::domain::{food_item, FoodFlavor, FoodItem};

/// [`FoodItem`] along with its [`FoodFlavor`]s.
#[derive(Clone, Debug)]
pub struct Listing {
    /// Listed [`FoodItem`].
    pub item: FoodItem,

    /// [`FoodFlavor`]s the [`FoodItem`] is offered in.
    pub flavors: Vec<FoodFlavor>,
}

impl Listing {
    /// Groups the provided [`FoodFlavor`]s by the provided [`FoodItem`]s,
    /// preserving the order of the latter.
    ///
    /// [`FoodFlavor`]s of unknown [`FoodItem`]s are discarded.
    #[must_use]
    pub fn group(
        items: impl IntoIterator<Item = FoodItem>,
        flavors: impl IntoIterator<Item = FoodFlavor>,
    ) -> Vec<Self> {
        let mut by_item = HashMap::<food_item::Id, Vec<FoodFlavor>>::new();
        for flavor in flavors {
            by_item.entry(flavor.food_item_id).or_default().push(flavor);
        }

        items
            .into_iter()
            .map(|item| Self {
                flavors: by_item.remove(&item.id).unwrap_or_default(),
                item,
            })
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{
        food_flavor, food_item, truck, FoodFlavor, FoodItem,
    };

    use super::Listing;

    fn item(name: &str) -> FoodItem {
        FoodItem {
            id: food_item::Id::new(),
            truck_id: truck::Id::new(),
            name: food_item::Name::new(name).unwrap(),
            price: "5.00".parse().unwrap(),
            quantity: food_item::Stock::new(10).unwrap(),
            item_type: food_item::ItemType::IceCream,
            image: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn flavor(item: &FoodItem, name: food_flavor::Name) -> FoodFlavor {
        FoodFlavor {
            id: food_flavor::Id::new(),
            food_item_id: item.id,
            name,
        }
    }

    #[test]
    fn groups_flavors_by_items() {
        let cone = item("Cone");
        let cup = item("Cup");
        let bar = item("Bar");
        let flavors = vec![
            flavor(&cup, food_flavor::Name::Mint),
            flavor(&cone, food_flavor::Name::Chocolate),
            flavor(&cup, food_flavor::Name::Strawberry),
            flavor(&item("Orphan"), food_flavor::Name::Pistachio),
        ];

        let listings = Listing::group(
            vec![cone.clone(), cup.clone(), bar.clone()],
            flavors,
        );

        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].item.id, cone.id);
        assert_eq!(
            listings[0].flavors.iter().map(|f| f.name).collect::<Vec<_>>(),
            [food_flavor::Name::Chocolate],
        );
        assert_eq!(listings[1].item.id, cup.id);
        assert_eq!(
            listings[1].flavors.iter().map(|f| f.name).collect::<Vec<_>>(),
            [food_flavor::Name::Mint, food_flavor::Name::Strawberry],
        );
        assert_eq!(listings[2].item.id, bar.id);
        assert!(listings[2].flavors.is_empty());
    }
}
