use crate::config::SheetConfig;
use groupsheet_sheet::Sheet;

/// Where the configured columns sit in one sheet, resolved once from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetSchema {
    pub category: Option<usize>,
    pub actual: Option<usize>,
    pub budget: Option<usize>,
}

impl SheetSchema {
    pub fn resolve(sheet: &Sheet, config: &SheetConfig) -> Self {
        Self {
            category: sheet.column_position(&config.category),
            actual: sheet.column_position(&config.actual),
            budget: sheet.column_position(&config.budget),
        }
    }
}
