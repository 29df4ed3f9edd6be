//! Business listings and their embedded reviews.
//!
//! A [`Business`] owns its reviews: they are stored with the listing, keep
//! insertion order, and disappear with it. Owner, subscriber, and author
//! fields hold raw [`UserId`] references; resolution into user summaries
//! happens in the read model (see [`crate::domain::views`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Maximum length of a business name.
pub const BUSINESS_NAME_MAX: usize = 120;
/// Maximum length of a review comment.
pub const REVIEW_COMMENT_MAX: usize = 2000;

/// Validation errors raised when building listings and reviews.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusinessValidationError {
    #[error("business id must be a valid UUID")]
    InvalidBusinessId,
    #[error("review id must be a valid UUID")]
    InvalidReviewId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("comment is required")]
    EmptyComment,
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
}

impl BusinessValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidBusinessId => "businessId",
            Self::InvalidReviewId => "reviewId",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyDescription => "description",
            Self::EmptyCategory => "category",
            Self::EmptyComment | Self::CommentTooLong { .. } => "comment",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBusinessId | Self::InvalidReviewId => "invalid_uuid",
            Self::EmptyName
            | Self::EmptyDescription
            | Self::EmptyCategory
            | Self::EmptyComment => "missing_field",
            Self::NameTooLong { .. } | Self::CommentTooLong { .. } => "too_long",
        }
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $invalid:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its string form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, BusinessValidationError> {
                Uuid::parse_str(id.as_ref().trim())
                    .map(Self)
                    .map_err(|_| BusinessValidationError::$invalid)
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Immutable business identifier.
    BusinessId,
    InvalidBusinessId
);
uuid_id!(
    /// Immutable review identifier.
    ReviewId,
    InvalidReviewId
);

fn required(value: &str, empty: BusinessValidationError) -> Result<String, BusinessValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    Ok(trimmed.to_owned())
}

fn business_name(value: &str) -> Result<String, BusinessValidationError> {
    let name = required(value, BusinessValidationError::EmptyName)?;
    if name.chars().count() > BUSINESS_NAME_MAX {
        return Err(BusinessValidationError::NameTooLong {
            max: BUSINESS_NAME_MAX,
        });
    }
    Ok(name)
}

/// Review embedded in a business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub author: UserId,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Business listing with its subscriber set and reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Business {
    pub id: BusinessId,
    pub owner: UserId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Persisted subscribers; unique and never containing `owner`.
    pub subscribers: Vec<UserId>,
    /// Reviews in insertion (chronological) order.
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Whether `user` owns this listing.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner == *user
    }

    /// Whether `user` is a persisted subscriber.
    pub fn has_subscriber(&self, user: &UserId) -> bool {
        self.subscribers.contains(user)
    }

    /// Look up an embedded review.
    pub fn review(&self, id: &ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|review| review.id == *id)
    }

    /// Every user id referenced by this listing, owner first.
    pub fn referenced_users(&self) -> Vec<UserId> {
        let mut ids = vec![self.owner];
        ids.extend(self.subscribers.iter().copied());
        ids.extend(self.reviews.iter().map(|review| review.author));
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Validated fields for a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDraft {
    pub name: String,
    pub description: String,
    pub category: String,
}

impl BusinessDraft {
    /// Validate raw listing fields.
    ///
    /// # Examples
    /// ```
    /// use listings_backend::domain::BusinessDraft;
    ///
    /// let draft = BusinessDraft::try_from_parts(" Cafe ", "Coffee", "Food").expect("valid draft");
    /// assert_eq!(draft.name, "Cafe");
    /// ```
    pub fn try_from_parts(
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<Self, BusinessValidationError> {
        Ok(Self {
            name: business_name(name)?,
            description: required(description, BusinessValidationError::EmptyDescription)?,
            category: required(category, BusinessValidationError::EmptyCategory)?,
        })
    }
}

/// Listing ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBusiness {
    pub id: BusinessId,
    pub owner: UserId,
    pub draft: BusinessDraft,
    pub created_at: DateTime<Utc>,
}

/// Partial update of listing fields; absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl BusinessPatch {
    /// Validate the fields that are present.
    pub fn try_from_parts(
        name: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, BusinessValidationError> {
        Ok(Self {
            name: name.map(business_name).transpose()?,
            description: description
                .map(|value| required(value, BusinessValidationError::EmptyDescription))
                .transpose()?,
            category: category
                .map(|value| required(value, BusinessValidationError::EmptyCategory))
                .transpose()?,
        })
    }

    /// Apply the patch to an in-memory listing.
    pub fn apply_to(&self, business: &mut Business, updated_at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            business.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            business.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            business.category.clone_from(category);
        }
        business.updated_at = updated_at;
    }
}

/// Validated review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment(String);

impl ReviewComment {
    /// Validate a comment; surrounding whitespace is trimmed.
    pub fn new(raw: &str) -> Result<Self, BusinessValidationError> {
        let comment = required(raw, BusinessValidationError::EmptyComment)?;
        if comment.chars().count() > REVIEW_COMMENT_MAX {
            return Err(BusinessValidationError::CommentTooLong {
                max: REVIEW_COMMENT_MAX,
            });
        }
        Ok(Self(comment))
    }
}

impl AsRef<str> for ReviewComment {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ReviewComment> for String {
    fn from(value: ReviewComment) -> Self {
        value.0
    }
}

/// Listing query used by the directory view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessFilter {
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Restrict to listings owned by this user.
    pub owner: Option<UserId>,
}

impl BusinessFilter {
    /// Normalise blank search and category values to `None`.
    pub fn new(search: Option<&str>, category: Option<&str>, owner: Option<UserId>) -> Self {
        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Self {
            search: non_blank(search),
            category: non_blank(category),
            owner,
        }
    }

    /// Evaluate the filter against a listing.
    pub fn matches(&self, business: &Business) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            contains_ignore_case(&business.name, needle)
                || contains_ignore_case(&business.description, needle)
        });
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| business.category == category);
        let owner_ok = self.owner.is_none_or(|owner| business.owner == owner);
        search_ok && category_ok && owner_ok
    }
}

/// Moderation query over reviews across all listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Case-insensitive substring matched against comment or business name.
    pub search: Option<String>,
}

impl ReviewFilter {
    /// Normalise a blank search to `None`.
    pub fn new(search: Option<&str>) -> Self {
        Self {
            search: search
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        }
    }

    /// Evaluate the filter against a review and its parent listing name.
    pub fn matches(&self, review: &Review, business_name: &str) -> bool {
        self.search.as_deref().is_none_or(|needle| {
            contains_ignore_case(&review.comment, needle)
                || contains_ignore_case(business_name, needle)
        })
    }
}

/// Review paired with the listing it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewListing {
    pub business_id: BusinessId,
    pub business_name: String,
    pub review: Review,
}

/// Case-insensitive substring test shared by in-process filters.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
