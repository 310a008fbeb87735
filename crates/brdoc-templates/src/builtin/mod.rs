//! Built-in B+R / IP Box document templates.

mod financial;
mod legal;
mod project;
mod report;
mod tax;
mod timesheet;

use crate::registry::DocumentTemplate;

/// All built-in templates, in registration order.
pub fn all() -> Vec<DocumentTemplate> {
    vec![
        project::project_card(),
        timesheet::timesheet_monthly(),
        financial::expense_registry(),
        tax::nexus_calculation(),
        report::br_annual_summary(),
        tax::ip_box_procedure(),
        tax::tax_interpretation_request(),
        legal::br_contract(),
    ]
}
