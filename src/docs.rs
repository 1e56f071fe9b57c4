use crate::api::audit_log::{AuditListResponse, AuditQuery, AuditView};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::overtime::{CreateOvertime, OvertimeQuery};
use crate::api::payroll::{BatchEntryUpdate, PayrollEntryView, PeriodQuery};
use crate::api::traffic_fine::{
    CreateFinePayment, CreateTrafficFine, TrafficFineDetail, TrafficFineSummary,
};
use crate::audit::AuditRecord;
use crate::model::employee::Employee;
use crate::model::overtime::{OvertimeEntry, OvertimeType};
use crate::model::payroll_entry::PayrollEntry;
use crate::model::traffic_fine::{TrafficFine, TrafficFinePayment};
use crate::payroll::reconcile::EntryPatch;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paydesk API",
        version = "1.0.0",
        description = r#"
## Timesheet & Payroll Administration

Backend for monthly timesheet and payroll administration of a small workforce.

### Key Features
- **Employee Management**
  - Profiles with salary, working-days base, insurance status and employment window
- **Payroll Periods**
  - One entry per employee per month, auto-created on first view
  - Official/cash pay split recomputed on every relevant edit
- **Overtime Ledger**
  - Itemized overtime entries kept in sync with per-month accumulators
- **Traffic Fines**
  - Fine and payment bookkeeping, independent of the payroll split
- **Audit Trail**
  - Field-level change history of every mutation

### Security
All endpoints except `/auth/login` require **JWT Bearer authentication**.
Mutations require the **Clerk** role or higher; employee deletion requires **Admin**.
"#,
    ),
    paths(
        crate::api::payroll::get_period_entries,
        crate::api::payroll::get_entry,
        crate::api::payroll::update_entry,
        crate::api::payroll::batch_update,

        crate::api::overtime::create_overtime,
        crate::api::overtime::delete_overtime,
        crate::api::overtime::list_overtime,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::traffic_fine::create_fine,
        crate::api::traffic_fine::list_employee_fines,
        crate::api::traffic_fine::get_fine,
        crate::api::traffic_fine::create_fine_payment,
        crate::api::traffic_fine::delete_fine_payment,

        crate::api::audit_log::list_audit_logs
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            PayrollEntry,
            PayrollEntryView,
            PeriodQuery,
            EntryPatch,
            BatchEntryUpdate,
            OvertimeType,
            OvertimeEntry,
            CreateOvertime,
            OvertimeQuery,
            TrafficFine,
            TrafficFinePayment,
            CreateTrafficFine,
            CreateFinePayment,
            TrafficFineSummary,
            TrafficFineDetail,
            AuditRecord,
            AuditQuery,
            AuditView,
            AuditListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Payroll", description = "Monthly payroll entries and the official/cash split"),
        (name = "Overtime", description = "Overtime ledger APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "TrafficFine", description = "Traffic fine bookkeeping APIs"),
        (name = "Audit", description = "Audit trail APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
