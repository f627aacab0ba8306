mod tier_copy;

pub use tier_copy::TierCopyEngine;
