// Voucher catalog
//
// Static mapping from operator-facing code ("4r") to the prefix, router
// profile, and display price of a voucher type. Built once at startup from
// config and never mutated. Iteration order is insertion order -- it drives
// the menu layout.

use indexmap::IndexMap;

use crate::error::CoreError;

/// One voucher type, immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherType {
    /// Operator-facing catalog code, e.g. `4r`. Never contains `_`.
    pub code: String,
    /// Username prefix for generated credentials, e.g. `4R`.
    pub prefix: String,
    /// Hotspot profile name on the router, e.g. `4Rb-24Jam`.
    pub profile: String,
    /// Display price, informational text only.
    pub price: String,
}

/// Ordered, immutable voucher-type lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: IndexMap<String, VoucherType>,
}

impl Catalog {
    /// Build a catalog, validating every code.
    ///
    /// Codes must be non-empty, free of `_` (it is the button-payload
    /// separator), and unique.
    pub fn new(types: impl IntoIterator<Item = VoucherType>) -> Result<Self, CoreError> {
        let mut entries = IndexMap::new();
        for voucher in types {
            if voucher.code.is_empty() {
                return Err(CoreError::Catalog {
                    message: "empty voucher code".into(),
                });
            }
            if voucher.code.contains('_') {
                return Err(CoreError::Catalog {
                    message: format!("voucher code '{}' contains '_'", voucher.code),
                });
            }
            if entries
                .insert(voucher.code.clone(), voucher)
                .is_some()
            {
                return Err(CoreError::Catalog {
                    message: "duplicate voucher code".into(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, code: &str) -> Option<&VoucherType> {
        self.entries.get(code)
    }

    /// Voucher types in insertion (menu) order.
    pub fn iter(&self) -> impl Iterator<Item = &VoucherType> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
