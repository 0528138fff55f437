pub mod affordability;
pub mod capacity;
pub mod comparison;
pub mod emi;
pub mod prepayment;
pub mod schedule;
