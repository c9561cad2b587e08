// src/launch/mod.rs

//! Everything decided before a runner process exists.
//!
//! - [`budget`] derives the memory ceiling (`ResourceBudgetCalculator`).
//! - [`command`] assembles the invocation (`CommandBuilder`, `CommandSpec`).

pub mod budget;
pub mod command;

pub use budget::{BudgetSource, ResourceBudget, ResourceBudgetCalculator};
pub use command::{CommandBuilder, CommandSpec};
