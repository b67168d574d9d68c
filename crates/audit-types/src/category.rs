//! Audit categories and the per-category breakdown chart

use std::collections::HashMap;

/// Fixed category labels the backend classifies documents into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AuditCategory {
    ComplianceAudit,
    VulnerabilityAssessment,
    PenetrationTesting,
    ApiSecurityAudit,
    IncidentResponseAudit,
    SecurityPolicyReview,
    NetworkSecurityAudit,
}

impl AuditCategory {
    pub const ALL: [AuditCategory; 7] = [
        AuditCategory::ComplianceAudit,
        AuditCategory::VulnerabilityAssessment,
        AuditCategory::PenetrationTesting,
        AuditCategory::ApiSecurityAudit,
        AuditCategory::IncidentResponseAudit,
        AuditCategory::SecurityPolicyReview,
        AuditCategory::NetworkSecurityAudit,
    ];

    /// Label used as the key in backend responses
    pub fn label(&self) -> &'static str {
        match self {
            AuditCategory::ComplianceAudit => "Compliance Audit",
            AuditCategory::VulnerabilityAssessment => "Vulnerability Assessment",
            AuditCategory::PenetrationTesting => "Penetration Testing",
            AuditCategory::ApiSecurityAudit => "API Security Audit",
            AuditCategory::IncidentResponseAudit => "Incident Response Audit",
            AuditCategory::SecurityPolicyReview => "Security Policy Review",
            AuditCategory::NetworkSecurityAudit => "Network Security Audit",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Chart fill, one theme slot per category
    pub fn chart_color(&self) -> &'static str {
        match self {
            AuditCategory::ComplianceAudit => "hsl(var(--chart-1))",
            AuditCategory::VulnerabilityAssessment => "hsl(var(--chart-2))",
            AuditCategory::PenetrationTesting => "hsl(var(--chart-3))",
            AuditCategory::ApiSecurityAudit => "hsl(var(--chart-4))",
            AuditCategory::IncidentResponseAudit => "hsl(var(--chart-5))",
            AuditCategory::SecurityPolicyReview => "hsl(var(--chart-6))",
            AuditCategory::NetworkSecurityAudit => "hsl(var(--chart-7))",
        }
    }
}

/// One slice of the category chart
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategorySlice {
    pub category: AuditCategory,
    pub label: String,
    pub fill: String,
    pub count: usize,
}

/// Document counts for every fixed category, in chart order
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoryBreakdown {
    pub slices: Vec<CategorySlice>,
}

impl CategoryBreakdown {
    /// Build from the backend's label -> members mapping.
    ///
    /// Categories the backend omits count as zero; labels outside the fixed
    /// set are ignored.
    pub fn from_members(categories: &HashMap<String, Vec<serde_json::Value>>) -> Self {
        let slices = AuditCategory::ALL
            .into_iter()
            .map(|category| CategorySlice {
                category,
                label: category.label().to_string(),
                fill: category.chart_color().to_string(),
                count: categories.get(category.label()).map_or(0, Vec::len),
            })
            .collect();
        Self { slices }
    }

    pub fn count(&self, category: AuditCategory) -> usize {
        self.slices
            .iter()
            .find(|s| s.category == category)
            .map_or(0, |s| s.count)
    }

    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.count).sum()
    }

    /// Share of the total in `[0, 1]`; zero when nothing is categorized
    pub fn proportion(&self, category: AuditCategory) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(category) as f64 / total as f64
    }
}

impl Default for CategoryBreakdown {
    fn default() -> Self {
        Self::from_members(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_round_trip() {
        for category in AuditCategory::ALL {
            assert_eq!(AuditCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(AuditCategory::from_label("Physical Security"), None);
    }

    #[test]
    fn test_breakdown_counts_members() {
        let mut categories = HashMap::new();
        categories.insert(
            "Vulnerability Assessment".to_string(),
            vec![json!("id-1"), json!("id-2"), json!("id-3")],
        );
        categories.insert("Compliance Audit".to_string(), vec![json!("id-4")]);
        categories.insert("Something Else".to_string(), vec![json!("id-5")]);

        let breakdown = CategoryBreakdown::from_members(&categories);
        assert_eq!(breakdown.slices.len(), 7);
        assert_eq!(breakdown.count(AuditCategory::VulnerabilityAssessment), 3);
        assert_eq!(breakdown.count(AuditCategory::ComplianceAudit), 1);
        assert_eq!(breakdown.count(AuditCategory::PenetrationTesting), 0);
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.proportion(AuditCategory::ComplianceAudit), 0.25);
    }

    #[test]
    fn test_breakdown_keeps_chart_order_and_colors() {
        let breakdown = CategoryBreakdown::default();
        assert_eq!(breakdown.slices[0].label, "Compliance Audit");
        assert_eq!(breakdown.slices[6].label, "Network Security Audit");
        assert_eq!(breakdown.slices[6].fill, "hsl(var(--chart-7))");
        assert_eq!(breakdown.proportion(AuditCategory::ApiSecurityAudit), 0.0);
    }
}
