// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Id,
    Date,
    Merchant,
    Category,
    Amount,
    Status,
    Description,
}

impl ColumnKey {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Date,
        Self::Merchant,
        Self::Category,
        Self::Amount,
        Self::Status,
        Self::Description,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Date => "date",
            Self::Merchant => "merchant",
            Self::Category => "category",
            Self::Amount => "amount",
            Self::Status => "status",
            Self::Description => "description",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "date" => Some(Self::Date),
            "merchant" => Some(Self::Merchant),
            "category" => Some(Self::Category),
            "amount" => Some(Self::Amount),
            "status" => Some(Self::Status),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    /// Position of the column in [`COLUMNS`] and in each record's cell array.
    pub const fn index(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Date => 1,
            Self::Merchant => 2,
            Self::Category => 3,
            Self::Amount => 4,
            Self::Status => 5,
            Self::Description => 6,
        }
    }

    pub const fn spec(self) -> &'static ColumnSpec {
        &COLUMNS[self.index()]
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Id | Self::Amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub label: &'static str,
    pub width: u16,
    pub pinnable: bool,
}

pub const COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec {
        key: ColumnKey::Id,
        label: "ID",
        width: 80,
        pinnable: true,
    },
    ColumnSpec {
        key: ColumnKey::Date,
        label: "Date",
        width: 180,
        pinnable: true,
    },
    ColumnSpec {
        key: ColumnKey::Merchant,
        label: "Merchant",
        width: 150,
        pinnable: false,
    },
    ColumnSpec {
        key: ColumnKey::Category,
        label: "Category",
        width: 150,
        pinnable: false,
    },
    ColumnSpec {
        key: ColumnKey::Amount,
        label: "Amount",
        width: 120,
        pinnable: false,
    },
    ColumnSpec {
        key: ColumnKey::Status,
        label: "Status",
        width: 120,
        pinnable: false,
    },
    ColumnSpec {
        key: ColumnKey::Description,
        label: "Description",
        width: 200,
        pinnable: false,
    },
];

#[cfg(test)]
mod tests {
    use super::{COLUMNS, ColumnKey};

    #[test]
    fn column_order_matches_key_index() {
        for (index, spec) in COLUMNS.iter().enumerate() {
            assert_eq!(spec.key.index(), index, "column {}", spec.label);
            assert_eq!(ColumnKey::ALL[index], spec.key);
        }
    }

    #[test]
    fn keys_round_trip_through_names() {
        for key in ColumnKey::ALL {
            assert_eq!(ColumnKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ColumnKey::parse("Merchant"), None);
    }

    #[test]
    fn only_id_and_date_are_pinnable() {
        let pinnable = COLUMNS
            .iter()
            .filter(|spec| spec.pinnable)
            .map(|spec| spec.key)
            .collect::<Vec<_>>();
        assert_eq!(pinnable, vec![ColumnKey::Id, ColumnKey::Date]);
    }
}
