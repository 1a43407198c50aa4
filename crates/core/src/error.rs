//! Error types for the aggregation transform.

use groupsheet_sheet::SheetError;
use thiserror::Error;

/// Result type for transform operations.
pub type GroupResult<T> = Result<T, GroupError>;

/// Fatal conditions. Any of these means no output workbook is produced.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The input bytes are not a readable workbook.
    #[error("Could not read workbook: {0}")]
    Parse(#[source] SheetError),

    /// One or more required sheets are absent from the input.
    #[error("Missing required sheets: {}", .missing.join(", "))]
    MissingSheets { missing: Vec<String> },

    /// Prorating horizon outside 1..=12.
    #[error("Months must be between 1 and 12, got {0}")]
    InvalidMonths(u32),

    /// The transform configuration is inconsistent.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The output workbook could not be written.
    #[error("Could not write workbook: {0}")]
    Serialize(#[source] SheetError),
}

impl GroupError {
    /// Whether the end user can fix this by changing their input.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::MissingSheets { .. } | Self::InvalidMonths(_) | Self::Parse(_)
        )
    }

    /// Names of the missing sheets, when that is the failure.
    pub fn missing_sheets(&self) -> Option<&[String]> {
        match self {
            Self::MissingSheets { missing } => Some(missing),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sheets_message_names_each_sheet() {
        let err = GroupError::MissingSheets {
            missing: vec!["WFA".to_string(), "PTC".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required sheets: WFA, PTC");
        assert_eq!(err.missing_sheets().unwrap(), ["WFA", "PTC"]);
        assert!(err.is_user_actionable());
    }

    #[test]
    fn serialize_failure_is_not_actionable() {
        let err = GroupError::Serialize(SheetError::Serialize("disk full".to_string()));
        assert!(!err.is_user_actionable());
        assert!(err.missing_sheets().is_none());
    }
}
