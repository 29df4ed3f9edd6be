//! Access control decisions for listings and reviews.
//!
//! [`authorize`] is a pure function of actor, action, and resource. Rules are
//! evaluated in a fixed order and the first match wins:
//!
//! 1. `Read` is public, including to anonymous actors.
//! 2. Every other action requires an authenticated actor.
//! 3. `Create` is allowed to any authenticated actor (quota is checked
//!    separately).
//! 4. `Update` requires ownership; `Delete` requires ownership or admin.
//! 5. `Subscribe` rejects owners and existing subscribers; `Unsubscribe`
//!    requires a current subscription.
//! 6. `ReviewCreate` rejects owners.
//! 7. `ReviewDelete` requires the review author, the listing owner, or admin.
//! 8. `Moderate` on the directory requires admin.
//!
//! Anything else is forbidden.

use crate::domain::{Business, Error, Review, Role, User, UserId};

/// Operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Subscribe,
    Unsubscribe,
    ReviewCreate,
    ReviewDelete,
    /// Cross-listing review moderation.
    Moderate,
}

/// Identity facts needed to make access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    /// Whether the principal holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    /// The authenticated principal, if any.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::Authenticated(Principal::from(user))
    }
}

/// Target of an operation.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// The listing collection (list and create).
    Directory,
    Business(&'a Business),
    Review {
        business: &'a Business,
        review: &'a Review,
    },
}

/// Category of a denied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// No credential was presented.
    Unauthenticated,
    /// The actor is known but not permitted.
    Forbidden,
    /// The action contradicts the current subscription state.
    Conflict,
}

/// Reason an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub kind: DenialKind,
    pub reason: &'static str,
}

impl Denial {
    const fn new(kind: DenialKind, reason: &'static str) -> Self {
        Self { kind, reason }
    }

    const fn forbidden(reason: &'static str) -> Self {
        Self::new(DenialKind::Forbidden, reason)
    }
}

impl From<Denial> for Error {
    fn from(denial: Denial) -> Self {
        match denial.kind {
            DenialKind::Unauthenticated => Error::unauthorized(denial.reason),
            DenialKind::Forbidden => Error::forbidden(denial.reason),
            DenialKind::Conflict => Error::conflict(denial.reason),
        }
    }
}

const LOGIN_REQUIRED: Denial = Denial::new(DenialKind::Unauthenticated, "Authentication required");
const NOT_PERMITTED: Denial = Denial::forbidden("Action not permitted");

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Examples
/// ```
/// use listings_backend::domain::access::{authorize, Action, Actor, DenialKind, Resource};
///
/// assert!(authorize(&Actor::Anonymous, Action::Read, Resource::Directory).is_ok());
/// let denied = authorize(&Actor::Anonymous, Action::Create, Resource::Directory)
///     .expect_err("anonymous create is denied");
/// assert_eq!(denied.kind, DenialKind::Unauthenticated);
/// ```
pub fn authorize(actor: &Actor, action: Action, resource: Resource<'_>) -> Result<(), Denial> {
    if action == Action::Read {
        return Ok(());
    }

    let Some(principal) = actor.principal() else {
        return Err(LOGIN_REQUIRED);
    };

    match (action, resource) {
        (Action::Create, Resource::Directory) => Ok(()),
        (Action::Update, Resource::Business(business)) => {
            if business.is_owned_by(&principal.id) {
                Ok(())
            } else {
                Err(Denial::forbidden("Not authorized to update this business"))
            }
        }
        (Action::Delete, Resource::Business(business)) => {
            if business.is_owned_by(&principal.id) || principal.is_admin() {
                Ok(())
            } else {
                Err(Denial::forbidden("Not authorized to delete this business"))
            }
        }
        (Action::Subscribe, Resource::Business(business)) => {
            if business.is_owned_by(&principal.id) {
                Err(Denial::forbidden("Cannot subscribe to your own business"))
            } else if business.has_subscriber(&principal.id) {
                Err(Denial::new(DenialKind::Conflict, "Already subscribed"))
            } else {
                Ok(())
            }
        }
        (Action::Unsubscribe, Resource::Business(business)) => {
            if business.has_subscriber(&principal.id) {
                Ok(())
            } else {
                Err(Denial::new(DenialKind::Conflict, "Not subscribed"))
            }
        }
        (Action::ReviewCreate, Resource::Business(business)) => {
            if business.is_owned_by(&principal.id) {
                Err(Denial::forbidden("Cannot review your own business"))
            } else {
                Ok(())
            }
        }
        (Action::ReviewDelete, Resource::Review { business, review }) => {
            if review.author == principal.id
                || business.is_owned_by(&principal.id)
                || principal.is_admin()
            {
                Ok(())
            } else {
                Err(Denial::forbidden("Not authorized to delete this review"))
            }
        }
        (Action::Moderate, Resource::Directory) => {
            if principal.is_admin() {
                Ok(())
            } else {
                Err(Denial::forbidden("Admin access required"))
            }
        }
        _ => Err(NOT_PERMITTED),
    }
}
