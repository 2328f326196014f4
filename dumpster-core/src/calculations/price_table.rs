//! Container price reference data.
//!
//! Prices are keyed by service area, material, size and payment method.
//! A missing leaf means the combination is not offered; it is never an
//! implicit zero.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MaterialType, PaymentMethod, ServiceArea, SizeClass};

/// Errors that can occur while building a [`PriceTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceTableError {
    /// A price leaf was zero or negative.
    #[error("price for {area}/{material}/{size}/{payment} must be positive, got {price}")]
    NonPositivePrice {
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
        payment: PaymentMethod,
        price: Decimal,
    },

    /// The material is never hauled in this container size.
    #[error("{material} is not offered in {size} containers")]
    UnsupportedSize {
        material: MaterialType,
        size: SizeClass,
    },

    /// The same combination was priced twice.
    #[error("duplicate price for {area}/{material}/{size}/{payment}")]
    DuplicateEntry {
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
        payment: PaymentMethod,
    },
}

/// One leaf of the price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub area: ServiceArea,
    pub material: MaterialType,
    pub size: SizeClass,
    pub payment: PaymentMethod,
    pub price: Decimal,
}

type SizePrices = BTreeMap<SizeClass, BTreeMap<PaymentMethod, Decimal>>;

/// Validated price table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    prices: BTreeMap<ServiceArea, BTreeMap<MaterialType, SizePrices>>,
}

impl PriceTable {
    /// Builds a table from individual leaves.
    ///
    /// # Errors
    ///
    /// Returns [`PriceTableError`] if a price is not positive, a size is not
    /// supported by its material, or a combination appears twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = PriceEntry>
    ) -> Result<Self, PriceTableError> {
        let mut table = Self::default();

        for entry in entries {
            if entry.price <= Decimal::ZERO {
                return Err(PriceTableError::NonPositivePrice {
                    area: entry.area,
                    material: entry.material,
                    size: entry.size,
                    payment: entry.payment,
                    price: entry.price,
                });
            }
            if !entry.material.supports(entry.size) {
                return Err(PriceTableError::UnsupportedSize {
                    material: entry.material,
                    size: entry.size,
                });
            }

            let previous = table
                .prices
                .entry(entry.area)
                .or_default()
                .entry(entry.material)
                .or_default()
                .entry(entry.size)
                .or_default()
                .insert(entry.payment, entry.price);

            if previous.is_some() {
                return Err(PriceTableError::DuplicateEntry {
                    area: entry.area,
                    material: entry.material,
                    size: entry.size,
                    payment: entry.payment,
                });
            }
        }

        Ok(table)
    }

    /// Looks up a single price.
    pub fn get(
        &self,
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
        payment: PaymentMethod,
    ) -> Option<Decimal> {
        self.prices
            .get(&area)?
            .get(&material)?
            .get(&size)?
            .get(&payment)
            .copied()
    }

    /// Whether any size of `material` is priced in `area`.
    pub fn has_material(
        &self,
        area: ServiceArea,
        material: MaterialType,
    ) -> bool {
        self.prices
            .get(&area)
            .and_then(|m| m.get(&material))
            .is_some_and(|sizes| sizes.values().any(|p| !p.is_empty()))
    }

    /// Whether `size` is priced for `material` in `area` with any payment method.
    pub fn has_size(
        &self,
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
    ) -> bool {
        self.prices
            .get(&area)
            .and_then(|m| m.get(&material))
            .and_then(|s| s.get(&size))
            .is_some_and(|p| !p.is_empty())
    }

    /// Every leaf, in key order.
    pub fn entries(&self) -> Vec<PriceEntry> {
        let mut out = Vec::new();
        for (&area, materials) in &self.prices {
            for (&material, sizes) in materials {
                for (&size, payments) in sizes {
                    for (&payment, &price) in payments {
                        out.push(PriceEntry {
                            area,
                            material,
                            size,
                            payment,
                            price,
                        });
                    }
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.prices
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The published two-zone price sheet.
    pub fn standard() -> Self {
        let entries = STANDARD_PRICES.iter().flat_map(|&(area, material, yards, cash, debit, credit)| {
            let size = SizeClass::from_cubic_yards(yards);
            [
                (PaymentMethod::Cash, cash),
                (PaymentMethod::Debit, debit),
                (PaymentMethod::Credit, credit),
            ]
            .into_iter()
            .filter_map(move |(payment, price)| {
                size.map(|size| PriceEntry {
                    area,
                    material,
                    size,
                    payment,
                    price,
                })
            })
        });

        let mut table = Self::default();
        for entry in entries {
            table
                .prices
                .entry(entry.area)
                .or_default()
                .entry(entry.material)
                .or_default()
                .entry(entry.size)
                .or_default()
                .insert(entry.payment, entry.price);
        }
        table
    }
}

type PriceRow = (ServiceArea, MaterialType, u32, Decimal, Decimal, Decimal);

use MaterialType::{
    Asphalt, CleanBrick, CleanConcrete, CleanDirt, ConstructionDemo, Mixed, TreesBrush,
};
use ServiceArea::{EastRiverhead, NassauSuffolk};

#[rustfmt::skip]
const STANDARD_PRICES: &[PriceRow] = &[
    // area           material          yd   cash          debit          credit
    (NassauSuffolk, ConstructionDemo,  5, dec!(425),  dec!(461.66),  dec!(475.46)),
    (NassauSuffolk, ConstructionDemo, 10, dec!(440),  dec!(477.95),  dec!(492.24)),
    (NassauSuffolk, ConstructionDemo, 15, dec!(540),  dec!(586.58),  dec!(604.12)),
    (NassauSuffolk, ConstructionDemo, 20, dec!(660),  dec!(716.93),  dec!(738.37)),
    (NassauSuffolk, ConstructionDemo, 30, dec!(760),  dec!(825.55),  dec!(850.23)),
    (NassauSuffolk, ConstructionDemo, 40, dec!(1000), dec!(1086.25), dec!(1118.73)),
    (NassauSuffolk, CleanConcrete,    10, dec!(600),  dec!(651.75),  dec!(671.24)),
    (NassauSuffolk, CleanConcrete,    15, dec!(675),  dec!(733.22),  dec!(755.14)),
    (NassauSuffolk, CleanConcrete,    20, dec!(800),  dec!(869.00),  dec!(894.98)),
    (NassauSuffolk, CleanDirt,        10, dec!(750),  dec!(814.69),  dec!(839.05)),
    (NassauSuffolk, CleanDirt,        15, dec!(850),  dec!(923.32),  dec!(950.93)),
    (NassauSuffolk, CleanDirt,        20, dec!(1200), dec!(1303.50), dec!(1342.47)),
    (NassauSuffolk, CleanBrick,        5, dec!(575),  dec!(624.60),  dec!(643.28)),
    (NassauSuffolk, CleanBrick,       10, dec!(825),  dec!(896.16),  dec!(922.96)),
    (NassauSuffolk, CleanBrick,       15, dec!(1075), dec!(1167.72), dec!(1202.63)),
    (NassauSuffolk, CleanBrick,       20, dec!(1625), dec!(1765.16), dec!(1817.94)),
    (NassauSuffolk, Asphalt,           5, dec!(650),  dec!(706.07),  dec!(727.18)),
    (NassauSuffolk, Asphalt,          10, dec!(750),  dec!(814.69),  dec!(839.05)),
    (NassauSuffolk, Asphalt,          15, dec!(1075), dec!(1167.72), dec!(1202.63)),
    (NassauSuffolk, Asphalt,          20, dec!(1400), dec!(1520.75), dec!(1566.22)),
    (NassauSuffolk, TreesBrush,       10, dec!(525),  dec!(570.29),  dec!(587.34)),
    (NassauSuffolk, TreesBrush,       15, dec!(625),  dec!(678.91),  dec!(699.21)),
    (NassauSuffolk, TreesBrush,       20, dec!(725),  dec!(787.54),  dec!(811.09)),
    (NassauSuffolk, TreesBrush,       30, dec!(925),  dec!(1004.79), dec!(1034.83)),
    (NassauSuffolk, TreesBrush,       40, dec!(1200), dec!(1303.50), dec!(1342.47)),
    (NassauSuffolk, Mixed,             5, dec!(650),  dec!(706.07),  dec!(727.18)),
    (NassauSuffolk, Mixed,            10, dec!(975),  dec!(1059.10), dec!(1090.77)),
    (NassauSuffolk, Mixed,            15, dec!(1300), dec!(1412.13), dec!(1454.35)),
    (NassauSuffolk, Mixed,            20, dec!(1625), dec!(1765.16), dec!(1817.94)),
    (EastRiverhead, ConstructionDemo,  5, dec!(475),  dec!(515.97),  dec!(531.40)),
    (EastRiverhead, ConstructionDemo, 10, dec!(490),  dec!(532.26),  dec!(548.18)),
    (EastRiverhead, ConstructionDemo, 15, dec!(590),  dec!(640.89),  dec!(660.05)),
    (EastRiverhead, ConstructionDemo, 20, dec!(700),  dec!(760.38),  dec!(783.12)),
    (EastRiverhead, ConstructionDemo, 30, dec!(810),  dec!(879.86),  dec!(906.18)),
    (EastRiverhead, ConstructionDemo, 40, dec!(1050), dec!(1140.56), dec!(1174.67)),
    (EastRiverhead, CleanConcrete,    10, dec!(625),  dec!(678.91),  dec!(699.21)),
    (EastRiverhead, CleanConcrete,    15, dec!(700),  dec!(760.38),  dec!(783.12)),
    (EastRiverhead, CleanConcrete,    20, dec!(825),  dec!(896.16),  dec!(922.95)),
    (EastRiverhead, CleanDirt,        10, dec!(775),  dec!(841.45),  dec!(866.61)),
    (EastRiverhead, CleanDirt,        15, dec!(875),  dec!(950.47),  dec!(978.89)),
    (EastRiverhead, CleanDirt,        20, dec!(1300), dec!(1412.13), dec!(1454.35)),
    (EastRiverhead, CleanBrick,        5, dec!(625),  dec!(678.91),  dec!(699.21)),
    (EastRiverhead, CleanBrick,       10, dec!(875),  dec!(950.47),  dec!(978.89)),
    (EastRiverhead, CleanBrick,       15, dec!(1125), dec!(1222.04), dec!(1258.58)),
    (EastRiverhead, CleanBrick,       20, dec!(1725), dec!(1873.78), dec!(1929.81)),
    (EastRiverhead, Asphalt,           5, dec!(675),  dec!(733.22),  dec!(755.14)),
    (EastRiverhead, Asphalt,          10, dec!(775),  dec!(841.84),  dec!(867.01)),
    (EastRiverhead, Asphalt,          15, dec!(1125), dec!(1222.03), dec!(1258.57)),
    (EastRiverhead, Asphalt,          20, dec!(1500), dec!(1629.38), dec!(1678.10)),
    (EastRiverhead, TreesBrush,       10, dec!(575),  dec!(624.60),  dec!(643.28)),
    (EastRiverhead, TreesBrush,       15, dec!(675),  dec!(733.22),  dec!(755.14)),
    (EastRiverhead, TreesBrush,       20, dec!(775),  dec!(841.85),  dec!(867.02)),
    (EastRiverhead, TreesBrush,       30, dec!(975),  dec!(1059.10), dec!(1090.77)),
    (EastRiverhead, TreesBrush,       40, dec!(1250), dec!(1357.82), dec!(1398.42)),
    (EastRiverhead, Mixed,             5, dec!(700),  dec!(760.38),  dec!(783.12)),
    (EastRiverhead, Mixed,            10, dec!(1025), dec!(1113.41), dec!(1146.70)),
    (EastRiverhead, Mixed,            15, dec!(1350), dec!(1466.44), dec!(1510.29)),
    (EastRiverhead, Mixed,            20, dec!(1675), dec!(1819.47), dec!(1873.87)),
];
