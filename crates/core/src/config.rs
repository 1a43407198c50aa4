//! Fixed configuration of the aggregation: which sheets are read, which
//! columns they carry, and how sheets are clustered in the output.

use crate::error::{GroupError, GroupResult};
use serde::Serialize;

/// Header of the derived per-row budget column.
pub const PRORATED_BUDGET: &str = "ProratedBudget";

/// Worksheet names compare case-insensitively, as they do in Excel.
pub(crate) fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Column layout of one required input sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetConfig {
    pub name: String,
    pub category: String,
    pub actual: String,
    pub budget: String,
}

impl SheetConfig {
    /// A sheet using the standard `Category` / `Actual` / `AnnualBudget` headers.
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: "Category".to_string(),
            actual: "Actual".to_string(),
            budget: "AnnualBudget".to_string(),
        }
    }
}

/// A group of source sheets summed together into one pair of output columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub sheets: Vec<String>,
}

impl Cluster {
    pub fn new<S: Into<String>>(sheets: impl IntoIterator<Item = S>) -> Self {
        Self {
            sheets: sheets.into_iter().map(Into::into).collect(),
        }
    }

    /// Display label, the member sheets joined with `+`.
    pub fn label(&self) -> String {
        self.sheets.join("+")
    }

    pub fn actuals_header(&self) -> String {
        format!("{} Actuals", self.label())
    }

    pub fn budget_header(&self) -> String {
        format!("{} Budget", self.label())
    }
}

/// Immutable configuration handed to [`crate::GroupTransform`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupConfig {
    pub sheets: Vec<SheetConfig>,
    pub clusters: Vec<Cluster>,
    /// Name of the appended aggregate sheet.
    pub group_sheet: String,
    /// Header of the category column in the aggregate sheet.
    pub category_header: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            sheets: ["TTW", "MRP", "TPO", "WFA", "PTC"]
                .into_iter()
                .map(SheetConfig::standard)
                .collect(),
            clusters: vec![
                Cluster::new(["TTW", "MRP"]),
                Cluster::new(["TPO"]),
                Cluster::new(["WFA", "PTC"]),
            ],
            group_sheet: "Group".to_string(),
            category_header: "Category".to_string(),
        }
    }
}

impl GroupConfig {
    /// Look up the configuration of a required sheet.
    pub fn sheet(&self, name: &str) -> Option<&SheetConfig> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Required sheet names in configuration order.
    pub fn required_sheets(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Header row of the aggregate sheet.
    pub fn group_headers(&self) -> Vec<String> {
        let mut headers = vec![self.category_header.clone()];
        for cluster in &self.clusters {
            headers.push(cluster.actuals_header());
            headers.push(cluster.budget_header());
        }
        headers
    }

    /// Check that every cluster member is a configured sheet and that the
    /// aggregate sheet does not shadow an input sheet.
    pub fn validate(&self) -> GroupResult<()> {
        for cluster in &self.clusters {
            if cluster.sheets.is_empty() {
                return Err(GroupError::InvalidConfig(
                    "cluster with no sheets".to_string(),
                ));
            }
            if let Some(unknown) = cluster.sheets.iter().find(|s| self.sheet(s).is_none()) {
                return Err(GroupError::InvalidConfig(format!(
                    "cluster {} references unconfigured sheet {unknown}",
                    cluster.label()
                )));
            }
        }
        if self
            .required_sheets()
            .any(|name| same_sheet_name(name, &self.group_sheet))
        {
            return Err(GroupError::InvalidConfig(format!(
                "aggregate sheet name {} collides with an input sheet",
                self.group_sheet
            )));
        }
        Ok(())
    }
}

/// Prorating horizon in months, always within `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Months(u32);

impl Months {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 12;

    pub fn new(value: u32) -> GroupResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GroupError::InvalidMonths(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Scale an annual figure to this many months.
    ///
    /// A full year returns the annual figure untouched so that no rounding
    /// creeps in from dividing and multiplying by 12.
    pub fn prorate(self, annual: f64) -> f64 {
        if self.0 == Self::MAX {
            annual
        } else {
            annual / 12.0 * f64::from(self.0)
        }
    }
}

impl Default for Months {
    fn default() -> Self {
        Self(9)
    }
}

impl TryFrom<u32> for Months {
    type Error = GroupError;

    fn try_from(value: u32) -> GroupResult<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_headers() {
        let config = GroupConfig::default();
        assert_eq!(
            config.group_headers(),
            vec![
                "Category",
                "TTW+MRP Actuals",
                "TTW+MRP Budget",
                "TPO Actuals",
                "TPO Budget",
                "WFA+PTC Actuals",
                "WFA+PTC Budget",
            ]
        );
        assert_eq!(
            config.required_sheets().collect::<Vec<_>>(),
            vec!["TTW", "MRP", "TPO", "WFA", "PTC"]
        );
        config.validate().unwrap();
    }

    #[test]
    fn cluster_with_unknown_sheet_is_rejected() {
        let mut config = GroupConfig::default();
        config.clusters.push(Cluster::new(["XYZ"]));

        let err = config.validate().unwrap_err();
        assert!(matches!(err, GroupError::InvalidConfig(msg) if msg.contains("XYZ")));
    }

    #[test]
    fn group_sheet_cannot_shadow_input() {
        let config = GroupConfig {
            group_sheet: "TPO".to_string(),
            ..GroupConfig::default()
        };
        assert!(matches!(config.validate(), Err(GroupError::InvalidConfig(_))));
    }

    #[test]
    fn group_sheet_collision_ignores_case() {
        let config = GroupConfig {
            group_sheet: "ttw".to_string(),
            ..GroupConfig::default()
        };
        assert!(matches!(config.validate(), Err(GroupError::InvalidConfig(_))));
        assert!(same_sheet_name("Group", "GROUP"));
        assert!(!same_sheet_name("Group", "Groups"));
    }

    #[test]
    fn months_bounds() {
        assert!(Months::new(0).is_err());
        assert!(Months::new(13).is_err());
        assert_eq!(Months::new(1).unwrap().get(), 1);
        assert_eq!(Months::try_from(12).unwrap().get(), 12);
        assert_eq!(Months::default().get(), 9);
    }

    #[test]
    fn prorate_nine_months() {
        let months = Months::new(9).unwrap();
        assert_eq!(months.prorate(1200.0), 900.0);
        assert_eq!(months.prorate(0.0), 0.0);
    }

    #[test]
    fn prorate_full_year_is_exact() {
        let months = Months::new(12).unwrap();
        for annual in [0.1, 1.0 / 3.0, 1234.567, -98.76] {
            assert_eq!(months.prorate(annual), annual);
        }
    }
}
