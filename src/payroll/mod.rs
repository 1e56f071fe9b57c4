pub mod calc;
pub mod reconcile;
pub mod split;
