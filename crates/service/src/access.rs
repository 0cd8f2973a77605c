//! Capability-based access control.
//!
//! Roles are parsed once from the persisted string and checked at the
//! service boundary; handlers never compare role strings themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Provider,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => models::user::ROLE_CUSTOMER,
            Role::Provider => models::user::ROLE_PROVIDER,
            Role::Seller => models::user::ROLE_SELLER,
            Role::Admin => models::user::ROLE_ADMIN,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            models::user::ROLE_CUSTOMER => Ok(Role::Customer),
            models::user::ROLE_PROVIDER => Ok(Role::Provider),
            models::user::ROLE_SELLER => Ok(Role::Seller),
            models::user::ROLE_ADMIN => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller is allowed to do. Admin holds everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateBooking,
    ActOnBooking,
    CancelBooking,
    CreateOrder,
    FulfillOrder,
    ManageServices,
    ManageProducts,
    RequestQuote,
    RespondQuote,
    DecideQuote,
    AdminOverride,
}

/// Authenticated caller, built per-request from the token. Passed explicitly
/// into every service call; there is no ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can(&self, cap: Capability) -> bool {
        use Capability::*;
        match self.role {
            Role::Admin => true,
            Role::Customer => matches!(cap, CreateBooking | CancelBooking | CreateOrder | RequestQuote | DecideQuote),
            Role::Provider => matches!(cap, ActOnBooking | ManageServices | RespondQuote),
            Role::Seller => matches!(cap, FulfillOrder | ManageProducts),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn admin_holds_every_capability() {
        let a = actor(Role::Admin);
        for cap in [
            Capability::CreateBooking,
            Capability::ActOnBooking,
            Capability::CancelBooking,
            Capability::CreateOrder,
            Capability::FulfillOrder,
            Capability::ManageServices,
            Capability::ManageProducts,
            Capability::RequestQuote,
            Capability::RespondQuote,
            Capability::DecideQuote,
            Capability::AdminOverride,
        ] {
            assert!(a.can(cap), "admin missing {:?}", cap);
        }
    }

    #[test]
    fn customer_cannot_fulfill_orders() {
        assert!(!actor(Role::Customer).can(Capability::FulfillOrder));
        assert!(actor(Role::Customer).can(Capability::CreateOrder));
    }

    #[test]
    fn provider_cannot_override() {
        assert!(!actor(Role::Provider).can(Capability::AdminOverride));
        assert!(actor(Role::Provider).can(Capability::ActOnBooking));
    }

    #[test]
    fn role_round_trips_through_string() {
        for r in [Role::Customer, Role::Provider, Role::Seller, Role::Admin] {
            assert_eq!(r.as_str().parse::<Role>().unwrap(), r);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
