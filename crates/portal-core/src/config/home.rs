//! Home grid and folder tree limits.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits governing the home grid and folder nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Number of columns on the home grid.
    #[serde(default = "default_columns")]
    pub columns: i32,
    /// Column a folder lands in when pinned without an explicit column.
    /// Defaults to the right-most column.
    #[serde(default)]
    pub default_pin_column: Option<i32>,
    /// Maximum number of folder levels, counting the root level.
    #[serde(default = "default_max_folder_depth")]
    pub max_folder_depth: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            default_pin_column: None,
            max_folder_depth: default_max_folder_depth(),
        }
    }
}

impl HomeConfig {
    /// Column used when pinning a folder without naming one.
    pub fn pin_column(&self) -> i32 {
        self.default_pin_column.unwrap_or(self.columns)
    }

    /// Whether `column` is a real grid column.
    pub fn is_column(&self, column: i32) -> bool {
        (1..=self.columns).contains(&column)
    }

    /// Reject settings the grid engine cannot honour.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.columns < 1 {
            return Err(AppError::configuration(
                "home.columns must be at least 1",
            ));
        }
        if !self.is_column(self.pin_column()) {
            return Err(AppError::configuration(format!(
                "home.default_pin_column must be between 1 and {}",
                self.columns
            )));
        }
        if self.max_folder_depth < 1 {
            return Err(AppError::configuration(
                "home.max_folder_depth must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_columns() -> i32 {
    4
}

fn default_max_folder_depth() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let home = HomeConfig::default();
        assert_eq!(home.columns, 4);
        assert_eq!(home.pin_column(), 4);
        assert_eq!(home.max_folder_depth, 3);
        assert!(home.validate().is_ok());
    }

    #[test]
    fn test_pin_column_outside_grid_is_rejected() {
        let home = HomeConfig {
            columns: 4,
            default_pin_column: Some(5),
            max_folder_depth: 3,
        };
        assert!(home.validate().is_err());
    }

    #[test]
    fn test_is_column() {
        let home = HomeConfig {
            columns: 5,
            ..HomeConfig::default()
        };
        assert!(!home.is_column(0));
        assert!(home.is_column(1));
        assert!(home.is_column(5));
        assert!(!home.is_column(6));
    }
}
