//! [`Truck`]-related read definitions.

use std::{collections::HashMap, fmt};

use derive_more::Into;
use rust_decimal::Decimal;

use crate::{
    domain::{food_item, truck, FoodFlavor, FoodItem, Sale, Truck},
    read,
};

/// Revenue of a [`Truck`]: sum of price × quantity over all its [`Sale`]s.
///
/// Always recomputed from the recorded [`Sale`]s and never stored.
#[derive(Clone, Copy, Debug, Eq, Hash, Into, PartialEq)]
pub struct TotalSales(Decimal);

impl TotalSales {
    /// [`TotalSales`] of a [`Truck`] without any [`Sale`]s.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Computes [`TotalSales`] of the provided [`Sale`]s, pricing them by the
    /// provided [`FoodItem`]s.
    ///
    /// [`Sale`]s of unknown [`FoodItem`]s are not counted.
    #[must_use]
    pub fn compute<'i, 's>(
        items: impl IntoIterator<Item = &'i FoodItem>,
        sales: impl IntoIterator<Item = &'s Sale>,
    ) -> Self {
        let prices = items
            .into_iter()
            .map(|i| (i.id, i.price))
            .collect::<HashMap<_, _>>();

        sales
            .into_iter()
            .filter_map(|s| {
                prices.get(&s.food_item_id).map(|p| p.times(s.quantity))
            })
            .fold(Self::ZERO, |Self(total), cost| Self(total + cost))
    }
}

impl fmt::Display for TotalSales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// [`Truck`] along with everything it sells and its [`TotalSales`].
#[derive(Clone, Debug)]
pub struct Inventory {
    /// [`Truck`] this [`Inventory`] belongs to.
    pub truck: Truck,

    /// [`FoodItem`]s sold by the [`Truck`].
    pub items: Vec<read::Listing>,

    /// [`TotalSales`] of the [`Truck`].
    pub total_sales: TotalSales,
}

impl Inventory {
    /// Assembles [`Inventory`]s of the provided [`Truck`]s, preserving their
    /// order.
    #[must_use]
    pub fn assemble(
        trucks: impl IntoIterator<Item = Truck>,
        items: Vec<FoodItem>,
        flavors: Vec<FoodFlavor>,
        sales: &[Sale],
    ) -> Vec<Self> {
        let mut sales_by_truck = HashMap::<truck::Id, Vec<&Sale>>::new();
        for sale in sales {
            sales_by_truck.entry(sale.truck_id).or_default().push(sale);
        }

        let mut listings_by_truck =
            HashMap::<truck::Id, Vec<read::Listing>>::new();
        for listing in read::Listing::group(items, flavors) {
            listings_by_truck
                .entry(listing.item.truck_id)
                .or_default()
                .push(listing);
        }

        trucks
            .into_iter()
            .map(|truck| {
                let items =
                    listings_by_truck.remove(&truck.id).unwrap_or_default();
                let total_sales = TotalSales::compute(
                    items.iter().map(|l| &l.item),
                    sales_by_truck.remove(&truck.id).unwrap_or_default(),
                );
                Self {
                    truck,
                    items,
                    total_sales,
                }
            })
            .collect()
    }

    /// Returns the [`read::Listing`] of the [`FoodItem`] with the provided
    /// ID, if it belongs to this [`Inventory`].
    #[must_use]
    pub fn item(&self, id: food_item::Id) -> Option<&read::Listing> {
        self.items.iter().find(|l| l.item.id == id)
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{
        food_flavor, food_item, sale, truck, FoodFlavor, FoodItem, Sale,
        Truck,
    };

    use super::{Inventory, TotalSales};

    fn truck(name: &str) -> Truck {
        Truck {
            id: truck::Id::new(),
            name: truck::Name::new(name).unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    fn item(truck: &Truck, price: &str) -> FoodItem {
        FoodItem {
            id: food_item::Id::new(),
            truck_id: truck.id,
            name: food_item::Name::new("Ice Cream").unwrap(),
            price: price.parse().unwrap(),
            quantity: food_item::Stock::new(10).unwrap(),
            item_type: food_item::ItemType::IceCream,
            image: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn sale(item: &FoodItem, quantity: u32) -> Sale {
        Sale {
            id: sale::Id::new(),
            food_item_id: item.id,
            truck_id: item.truck_id,
            user_id: None,
            quantity: sale::Quantity::new(quantity).unwrap(),
            purchased_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn zero_without_sales() {
        let truck = truck("Test Truck");
        let items = vec![item(&truck, "5.00")];

        let total = TotalSales::compute(&items, &Vec::<Sale>::new());

        assert_eq!(total, TotalSales::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn sums_price_times_quantity() {
        let truck = truck("Test Truck");
        let items = vec![item(&truck, "5.00")];
        let mut sales = vec![sale(&items[0], 2)];

        let total = TotalSales::compute(&items, &sales);
        assert_eq!(total.to_string(), "10.00");

        sales.push(sale(&items[0], 1));
        let total = TotalSales::compute(&items, &sales);
        assert_eq!(total.to_string(), "15.00");
        assert_eq!(Decimal::from(total), "15.00".parse().unwrap());
    }

    #[test]
    fn prices_each_sale_by_its_item() {
        let truck = truck("Test Truck");
        let items = vec![item(&truck, "2.50"), item(&truck, "0.99")];
        let sales = vec![
            sale(&items[0], 3),
            sale(&items[1], 1),
            sale(&items[1], 2),
        ];

        let total = TotalSales::compute(&items, &sales);

        assert_eq!(total.to_string(), "10.47");
    }

    #[test]
    fn assembles_inventories_per_truck() {
        let first = truck("First");
        let second = truck("Second");
        let empty = truck("Empty");
        let cone = item(&first, "5.00");
        let bar = item(&second, "1.25");
        let flavors = vec![FoodFlavor {
            id: food_flavor::Id::new(),
            food_item_id: cone.id,
            name: food_flavor::Name::Chocolate,
        }];
        let sales = vec![sale(&cone, 2), sale(&bar, 4), sale(&cone, 1)];

        let inventories = Inventory::assemble(
            vec![first.clone(), second.clone(), empty.clone()],
            vec![cone.clone(), bar.clone()],
            flavors,
            &sales,
        );

        assert_eq!(inventories.len(), 3);

        assert_eq!(inventories[0].truck.id, first.id);
        assert_eq!(inventories[0].items.len(), 1);
        assert_eq!(inventories[0].item(cone.id).unwrap().flavors.len(), 1);
        assert_eq!(inventories[0].total_sales.to_string(), "15.00");

        assert_eq!(inventories[1].truck.id, second.id);
        assert!(inventories[1].item(cone.id).is_none());
        assert!(inventories[1].item(bar.id).unwrap().flavors.is_empty());
        assert_eq!(inventories[1].total_sales.to_string(), "5.00");

        assert_eq!(inventories[2].truck.id, empty.id);
        assert!(inventories[2].items.is_empty());
        assert_eq!(inventories[2].total_sales, TotalSales::ZERO);
    }
}
