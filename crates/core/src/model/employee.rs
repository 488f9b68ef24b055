use crate::model::ids::EmployeeId;

/// Directory record for a company employee.
///
/// The authenticated session yields a user; the matching employee row is
/// resolved by email once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub email: String,
}
