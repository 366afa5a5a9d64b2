/// Employee role tiers
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hr,
    Hod,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hr => "hr",
            Role::Hod => "hod",
            Role::Employee => "employee",
        }
    }

    /// HOD and Employee accounts must belong to a department.
    pub fn requires_department(&self) -> bool {
        matches!(self, Role::Hod | Role::Employee)
    }

    /// Only HR may provision new accounts.
    pub fn can_register_accounts(&self) -> bool {
        matches!(self, Role::Hr)
    }

    pub fn can_view_department_roster(&self) -> bool {
        matches!(self, Role::Hr | Role::Hod)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hr" => Ok(Role::Hr),
            "hod" => Ok(Role::Hod),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
