use crate::api::attendance::{AttendanceRangeQuery, EditAttendance};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::holiday::HolidayPayload;
use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::payroll::{
    ComputeQuery, GeneratePayroll, PayrollFilter, PayrollQueryResponse,
};
use crate::api::schedule::AssignSchedule;
use crate::engine::payroll::{LedgerRow, PayrollSummary};
use crate::model::attendance::{AttendanceStatus, LogType};
use crate::model::employee::Employee;
use crate::model::holiday::HolidayType;
use crate::model::leave::{LeaveStatus, LeaveType};
use crate::model::payroll::Payroll;
use crate::model::work_schedule::ShiftType;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Back Office API",
        version = "1.0.0",
        description = r#"
## Multi-tenant HR Back Office

Employee records, attendance tracking, leave requests, office holidays, work
schedules and payroll computation, scoped per company tenant.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Attendance Tracking**
  - Check-in/check-out with derived status, late/early/overtime minutes
  - Background auto-checkout for forgotten check-outs
- **Leave Management**
  - Apply for leave, approve/reject requests
- **Office Holidays**
  - Date-range holidays propagated into every employee's attendance
- **Payroll**
  - Month walk with strict day classification, per-day ledger and summary

### 🔐 Security
All endpoints expect **JWT Bearer authentication** issued by the identity
service. Authorization is capability-based over the roles
**owner / admin / hr / employee**, always scoped to the caller's company.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::edit_attendance,
        crate::api::attendance::list_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::holiday::create_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,
        crate::api::holiday::list_holidays,

        crate::api::schedule::assign_schedule,
        crate::api::schedule::effective_schedule,

        crate::api::payroll::compute_payroll,
        crate::api::payroll::generate_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,

        crate::api::company::get_company,
        crate::api::company::update_company
    ),
    components(
        schemas(
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            CreateLeave,
            LeaveType,
            LeaveStatus,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            EditAttendance,
            AttendanceRangeQuery,
            AttendanceStatus,
            LogType,
            HolidayPayload,
            HolidayType,
            AssignSchedule,
            ShiftType,
            ComputeQuery,
            GeneratePayroll,
            PayrollFilter,
            PayrollQueryResponse,
            Payroll,
            PayrollSummary,
            LedgerRow
        )
    ),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Holiday", description = "Office holiday APIs"),
        (name = "Schedule", description = "Work schedule APIs"),
        (name = "Payroll", description = "Payroll computation APIs"),
        (name = "Company", description = "Company settings APIs"),
    )
)]
pub struct ApiDoc;
