//! Closed enumerations of the B+R documentation domain.
//!
//! Category tags mirror art. 18d CIT cost categories; each carries its
//! statutory deduction rate and the Nexus-formula component it feeds.

use serde::{Deserialize, Serialize};

/// Categories of generated B+R documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Project,
    Financial,
    Timesheet,
    Legal,
    Tax,
    Report,
}

/// Time scope of a document template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeScope {
    None,
    Monthly,
    Quarterly,
    Yearly,
    Project,
    Custom,
}

/// B+R expense categories according to art. 18d CIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrCategory {
    /// Wynagrodzenia UoP
    PersonnelEmployment,
    /// Umowy cywilnoprawne
    PersonnelCivil,
    /// Materiały i surowce
    Materials,
    /// Sprzęt i wyposażenie
    Equipment,
    /// Amortyzacja
    Depreciation,
    /// Ekspertyzy i opinie
    Expertise,
    /// Usługi zewnętrzne (niepowiązane)
    ExternalServices,
    /// Usługi od podmiotów powiązanych
    RelatedServices,
    /// Zakup gotowego IP
    IpPurchase,
    /// Inne koszty kwalifikowane
    Other,
}

/// Component of the Nexus formula a cost category contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NexusComponent {
    /// Direct B+R costs
    A,
    /// Unrelated-party acquisition costs
    B,
    /// Related-party acquisition costs
    C,
    /// Purchase of finished IP
    D,
}

impl BrCategory {
    /// All category tags, in registration order.
    pub const ALL: [BrCategory; 10] = [
        BrCategory::PersonnelEmployment,
        BrCategory::PersonnelCivil,
        BrCategory::Materials,
        BrCategory::Equipment,
        BrCategory::Depreciation,
        BrCategory::Expertise,
        BrCategory::ExternalServices,
        BrCategory::RelatedServices,
        BrCategory::IpPurchase,
        BrCategory::Other,
    ];

    /// Statutory deduction rate for this category (2.0 = 200%).
    pub fn deduction_rate(&self) -> f64 {
        match self {
            BrCategory::PersonnelEmployment | BrCategory::PersonnelCivil => 2.0,
            _ => 1.0,
        }
    }

    /// Nexus formula component this category feeds.
    ///
    /// `external_services` and `related_services` are distinct on purpose:
    /// the former is component `b`, the latter `c`.
    pub fn nexus_component(&self) -> NexusComponent {
        match self {
            BrCategory::ExternalServices => NexusComponent::B,
            BrCategory::RelatedServices => NexusComponent::C,
            BrCategory::IpPurchase => NexusComponent::D,
            _ => NexusComponent::A,
        }
    }

    /// Polish display name, as used in generated documents.
    pub fn display_name_pl(&self) -> &'static str {
        match self {
            BrCategory::PersonnelEmployment => "Wynagrodzenia pracowników (umowa o pracę)",
            BrCategory::PersonnelCivil => "Wynagrodzenia (umowy cywilnoprawne)",
            BrCategory::Materials => "Materiały i surowce",
            BrCategory::Equipment => "Sprzęt specjalistyczny",
            BrCategory::Depreciation => "Amortyzacja",
            BrCategory::Expertise => "Ekspertyzy i opinie",
            BrCategory::ExternalServices => "Usługi zewnętrzne",
            BrCategory::RelatedServices => "Usługi od podmiotów powiązanych",
            BrCategory::IpPurchase => "Zakup IP",
            BrCategory::Other => "Inne koszty kwalifikowane",
        }
    }

    /// Polish display name with the deduction rate appended, for prompts.
    pub fn display_name_with_rate_pl(&self) -> String {
        let pct = (self.deduction_rate() * 100.0) as u32;
        format!("{} - {}%", self.display_name_pl(), pct)
    }

    /// Snake-case tag as it appears in the read model.
    pub fn tag(&self) -> &'static str {
        match self {
            BrCategory::PersonnelEmployment => "personnel_employment",
            BrCategory::PersonnelCivil => "personnel_civil",
            BrCategory::Materials => "materials",
            BrCategory::Equipment => "equipment",
            BrCategory::Depreciation => "depreciation",
            BrCategory::Expertise => "expertise",
            BrCategory::ExternalServices => "external_services",
            BrCategory::RelatedServices => "related_services",
            BrCategory::IpPurchase => "ip_purchase",
            BrCategory::Other => "other",
        }
    }

    /// Parse a read-model tag; unknown tags map to `Other`.
    pub fn from_tag(tag: &str) -> BrCategory {
        match tag {
            "personnel_employment" => BrCategory::PersonnelEmployment,
            "personnel_civil" => BrCategory::PersonnelCivil,
            "materials" => BrCategory::Materials,
            "equipment" => BrCategory::Equipment,
            "depreciation" => BrCategory::Depreciation,
            "expertise" => BrCategory::Expertise,
            "external_services" => BrCategory::ExternalServices,
            "related_services" => BrCategory::RelatedServices,
            "ip_purchase" => BrCategory::IpPurchase,
            _ => BrCategory::Other,
        }
    }
}

/// Types of expense documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Invoice,
    Receipt,
    Contract,
    Payroll,
    Other,
}

/// Polish VAT rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VatRate {
    #[serde(rename = "23")]
    Vat23,
    #[serde(rename = "8")]
    Vat8,
    #[serde(rename = "5")]
    Vat5,
    #[serde(rename = "0")]
    Vat0,
    /// Exempt
    #[serde(rename = "zw")]
    Zw,
    /// Not applicable
    #[serde(rename = "np")]
    Np,
}

impl VatRate {
    /// VAT rate as a decimal fraction.
    pub fn rate(&self) -> f64 {
        match self {
            VatRate::Vat23 => 0.23,
            VatRate::Vat8 => 0.08,
            VatRate::Vat5 => 0.05,
            VatRate::Vat0 | VatRate::Zw | VatRate::Np => 0.0,
        }
    }
}

/// Status of document processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Validated,
    Rejected,
}

/// Types of B+R tasks for time-entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrTaskType {
    Research,
    Development,
    Testing,
    Documentation,
    Analysis,
    Prototyping,
    Experiment,
}

/// Standard time slots for work tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    /// 08:00-12:00
    Morning,
    /// 12:00-16:00
    Afternoon,
    /// 16:00-20:00
    Evening,
    /// 20:00-08:00
    Night,
}

/// Status of a project milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Planned,
    InProgress,
    Completed,
    Delayed,
}

/// Type of innovation claimed by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnovationType {
    Product,
    Process,
    Service,
    Organizational,
}

/// Scope of innovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnovationScope {
    Company,
    National,
    Global,
}

/// Level of technological uncertainty in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyLevel {
    High,
    Medium,
    Low,
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    /// Informational only
    Info,
    /// Requires attention
    Warning,
    /// Blocks document approval
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personnel_categories_carry_double_rate() {
        assert_eq!(BrCategory::PersonnelEmployment.deduction_rate(), 2.0);
        assert_eq!(BrCategory::PersonnelCivil.deduction_rate(), 2.0);
        assert_eq!(BrCategory::Materials.deduction_rate(), 1.0);
        assert_eq!(BrCategory::IpPurchase.deduction_rate(), 1.0);
    }

    #[test]
    fn nexus_components_keep_related_and_external_distinct() {
        assert_eq!(
            BrCategory::ExternalServices.nexus_component(),
            NexusComponent::B
        );
        assert_eq!(
            BrCategory::RelatedServices.nexus_component(),
            NexusComponent::C
        );
        assert_eq!(BrCategory::IpPurchase.nexus_component(), NexusComponent::D);
        assert_eq!(BrCategory::Depreciation.nexus_component(), NexusComponent::A);
    }

    #[test]
    fn tag_round_trip() {
        for cat in BrCategory::ALL {
            assert_eq!(BrCategory::from_tag(cat.tag()), cat);
        }
        assert_eq!(BrCategory::from_tag("unheard_of"), BrCategory::Other);
    }
}
