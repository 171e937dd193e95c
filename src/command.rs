//! Command models for CSV parsing.

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Raw command record as read from CSV.
///
/// Every column except `type` is optional; which ones are required depends
/// on the command type. The trailing `rename` column is only read by `edit`
/// rows and may be left out of the header entirely.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Command type: material, edit, increase, decrease, delete, reserve, unreserve, clear,
    /// checkout
    #[serde(rename = "type")]
    pub kind: String,

    /// Borrower name (checkout)
    pub person: Option<String>,

    /// Material name (all material and cart commands)
    pub material: Option<String>,

    /// Unsigned quantity (material, increase, decrease, reserve)
    pub quantity: Option<String>,

    /// First lending day, `YYYY-MM-DD` (reserve)
    pub start: Option<String>,

    /// Last lending day, `YYYY-MM-DD` (reserve)
    pub end: Option<String>,

    /// Material description (material, edit)
    pub description: Option<String>,

    /// New material name (edit)
    #[serde(default)]
    pub rename: Option<String>,
}

/// A parsed command ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add stock under a name, creating the material if needed.
    Material {
        name: String,
        description: String,
        quantity: u32,
    },

    /// Overwrite fields of an existing material. Blank columns keep the
    /// current value.
    Edit {
        name: String,
        new_name: Option<String>,
        description: Option<String>,
        quantity: Option<u32>,
    },

    /// Add units to an existing material.
    Increase { name: String, quantity: u32 },

    /// Remove units from an existing material, stopping at zero.
    Decrease { name: String, quantity: u32 },

    /// Delete a material that no reservation references.
    Delete { name: String },

    /// Put a draft into the cart. Dates may be missing; that is reported at checkout.
    Reserve {
        name: String,
        quantity: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },

    /// Drop a material's draft from the cart.
    Unreserve { name: String },

    /// Empty the cart.
    Clear,

    /// Check out the cart for a person.
    Checkout { person: String },
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    ///
    /// `row` is only used for error reporting.
    pub fn parse(&self, row: usize) -> Result<Command> {
        let kind = self.kind.trim().to_lowercase();

        match kind.as_str() {
            "material" => Ok(Command::Material {
                name: required(&self.material, "material", row)?,
                description: non_blank(&self.description).unwrap_or_default(),
                quantity: self.quantity(row)?,
            }),
            "edit" => Ok(Command::Edit {
                name: required(&self.material, "material", row)?,
                new_name: non_blank(&self.rename),
                description: non_blank(&self.description),
                quantity: match non_blank(&self.quantity) {
                    Some(_) => Some(self.quantity(row)?),
                    None => None,
                },
            }),
            "increase" => Ok(Command::Increase {
                name: required(&self.material, "material", row)?,
                quantity: self.quantity(row)?,
            }),
            "decrease" => Ok(Command::Decrease {
                name: required(&self.material, "material", row)?,
                quantity: self.quantity(row)?,
            }),
            "delete" => Ok(Command::Delete {
                name: required(&self.material, "material", row)?,
            }),
            "reserve" => Ok(Command::Reserve {
                name: required(&self.material, "material", row)?,
                quantity: self.quantity(row)?,
                start: parse_date(&self.start, "start", row)?,
                end: parse_date(&self.end, "end", row)?,
            }),
            "unreserve" => Ok(Command::Unreserve {
                name: required(&self.material, "material", row)?,
            }),
            "clear" => Ok(Command::Clear),
            "checkout" => Ok(Command::Checkout {
                person: non_blank(&self.person).unwrap_or_default(),
            }),
            other => Err(invalid(row, format!("unknown command type '{}'", other))),
        }
    }

    fn quantity(&self, row: usize) -> Result<u32> {
        let raw = required(&self.quantity, "quantity", row)?;
        raw.parse::<u32>()
            .map_err(|_| invalid(row, format!("invalid quantity '{}'", raw)))
    }
}

fn required(field: &Option<String>, column: &str, row: usize) -> Result<String> {
    non_blank(field).ok_or_else(|| invalid(row, format!("missing {}", column)))
}

fn non_blank(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_date(field: &Option<String>, column: &str, row: usize) -> Result<Option<NaiveDate>> {
    let Some(raw) = non_blank(field) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| invalid(row, format!("invalid {} date '{}'", column, raw)))
}

fn invalid(row: usize, message: String) -> EngineError {
    EngineError::InvalidRecord { row, message }
}
