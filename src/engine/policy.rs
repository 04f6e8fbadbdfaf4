//! Capability-based authorization: one matrix instead of per-handler role
//! checks. Tenant mismatch always denies, regardless of role.

use crate::model::role::Role;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    ManageCompany,
    ManageEmployees,
    ViewEmployees,
    ManageSchedules,
    RecordOwnAttendance,
    EditAttendance,
    RequestLeave,
    DecideLeave,
    ManageHolidays,
    RunPayroll,
    ViewPayroll,
}

pub fn can_perform(
    role: Role,
    principal_company: u64,
    action: Action,
    resource_company: u64,
) -> bool {
    if principal_company != resource_company {
        return false;
    }

    use Action::*;
    match role {
        Role::Owner => true,
        Role::Admin => !matches!(action, ManageCompany),
        Role::Hr => matches!(
            action,
            ManageEmployees
                | ViewEmployees
                | ManageSchedules
                | RecordOwnAttendance
                | EditAttendance
                | RequestLeave
                | DecideLeave
                | ManageHolidays
                | RunPayroll
                | ViewPayroll
        ),
        Role::Employee => matches!(action, RecordOwnAttendance | RequestLeave),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_mismatch_denies_even_owner() {
        assert!(!can_perform(Role::Owner, 1, Action::ViewEmployees, 2));
        assert!(can_perform(Role::Owner, 1, Action::ViewEmployees, 1));
    }

    #[test]
    fn owner_only_company_management() {
        assert!(can_perform(Role::Owner, 1, Action::ManageCompany, 1));
        assert!(!can_perform(Role::Admin, 1, Action::ManageCompany, 1));
        assert!(!can_perform(Role::Hr, 1, Action::ManageCompany, 1));
        assert!(!can_perform(Role::Employee, 1, Action::ManageCompany, 1));
    }

    #[test]
    fn hr_runs_payroll_but_employee_does_not() {
        assert!(can_perform(Role::Hr, 1, Action::RunPayroll, 1));
        assert!(can_perform(Role::Hr, 1, Action::DecideLeave, 1));
        assert!(!can_perform(Role::Employee, 1, Action::RunPayroll, 1));
        assert!(!can_perform(Role::Employee, 1, Action::DecideLeave, 1));
    }

    #[test]
    fn employee_self_service_actions() {
        assert!(can_perform(Role::Employee, 1, Action::RecordOwnAttendance, 1));
        assert!(can_perform(Role::Employee, 1, Action::RequestLeave, 1));
        assert!(!can_perform(Role::Employee, 1, Action::EditAttendance, 1));
        assert!(!can_perform(Role::Employee, 1, Action::ManageHolidays, 1));
    }
}
