use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Closed role set. Stored as the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
            Role::Employee => "employee",
        }
    }
}

impl Default for Role {
    /// Registration without an explicit role lands here.
    fn default() -> Self {
        Role::Technician
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resources the permission table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Team,
    Technician,
    Equipment,
    EquipmentCategory,
    WorkCenter,
    MaintenanceRequest,
}

/// Actions a handler can ask about. Stage transitions on maintenance
/// requests are gated as `Update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// Declarative policy: (role, resource, action) -> allow.
///
/// Reads are open to everyone, including unauthenticated callers; the GET
/// endpoints never consult this table at all. The open-read / closed-write
/// asymmetry is intentional.
pub fn allowed(role: Role, resource: Resource, action: Action) -> bool {
    use Action::*;
    use Resource::*;
    use Role::*;

    match (resource, action) {
        (_, Read) => true,
        (Team, _) => role == Admin,
        (MaintenanceRequest, Create) => true,
        (MaintenanceRequest, Update) => matches!(role, Admin | Manager | Role::Technician),
        (MaintenanceRequest, Delete) => matches!(role, Admin | Manager),
        // Technician, Equipment, EquipmentCategory, WorkCenter mutations
        _ => matches!(role, Admin | Manager),
    }
}

/// Gate a mutating handler. Deny means the handler never reaches the store.
pub fn check(role: Role, resource: Resource, action: Action) -> Result<(), ApiError> {
    if allowed(role, resource, action) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 4] = [Role::Admin, Role::Manager, Role::Technician, Role::Employee];
    const ALL_RESOURCES: [Resource; 6] = [
        Resource::Team,
        Resource::Technician,
        Resource::Equipment,
        Resource::EquipmentCategory,
        Resource::WorkCenter,
        Resource::MaintenanceRequest,
    ];

    #[test]
    fn teams_are_admin_only() {
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(allowed(Role::Admin, Resource::Team, action));
            assert!(!allowed(Role::Manager, Resource::Team, action));
            assert!(!allowed(Role::Technician, Resource::Team, action));
            assert!(!allowed(Role::Employee, Resource::Team, action));
        }
    }

    #[test]
    fn employee_cannot_create_team() {
        assert!(check(Role::Employee, Resource::Team, Action::Create).is_err());
        assert!(check(Role::Admin, Resource::Team, Action::Create).is_ok());
    }

    #[test]
    fn managed_resources_allow_admin_and_manager() {
        for resource in [
            Resource::Technician,
            Resource::Equipment,
            Resource::EquipmentCategory,
            Resource::WorkCenter,
        ] {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(allowed(Role::Admin, resource, action));
                assert!(allowed(Role::Manager, resource, action));
                assert!(!allowed(Role::Technician, resource, action));
                assert!(!allowed(Role::Employee, resource, action));
            }
        }
    }

    #[test]
    fn any_authenticated_role_may_create_requests() {
        for role in ALL_ROLES {
            assert!(allowed(role, Resource::MaintenanceRequest, Action::Create));
        }
    }

    #[test]
    fn request_updates_exclude_employees() {
        assert!(allowed(Role::Admin, Resource::MaintenanceRequest, Action::Update));
        assert!(allowed(Role::Manager, Resource::MaintenanceRequest, Action::Update));
        assert!(allowed(Role::Technician, Resource::MaintenanceRequest, Action::Update));
        assert!(!allowed(Role::Employee, Resource::MaintenanceRequest, Action::Update));
    }

    #[test]
    fn request_deletes_are_admin_or_manager() {
        assert!(allowed(Role::Admin, Resource::MaintenanceRequest, Action::Delete));
        assert!(allowed(Role::Manager, Resource::MaintenanceRequest, Action::Delete));
        assert!(!allowed(Role::Technician, Resource::MaintenanceRequest, Action::Delete));
        assert!(!allowed(Role::Employee, Resource::MaintenanceRequest, Action::Delete));
    }

    #[test]
    fn reads_are_open_for_every_role_and_resource() {
        for role in ALL_ROLES {
            for resource in ALL_RESOURCES {
                assert!(allowed(role, resource, Action::Read));
            }
        }
    }

    #[test]
    fn default_role_is_technician() {
        assert_eq!(Role::default(), Role::Technician);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"employee\"").unwrap(),
            Role::Employee
        );
    }
}
