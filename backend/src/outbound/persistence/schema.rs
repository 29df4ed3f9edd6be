//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lowercase.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// One of `Standard`, `Gold`, `Platinum`.
        plan -> Varchar,
        /// One of `user`, `admin`.
        role -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Business listings.
    businesses (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        description -> Text,
        category -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Persisted subscriber set of each listing.
    business_subscribers (business_id, user_id) {
        business_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews embedded in a listing; removed with it via `ON DELETE CASCADE`.
    reviews (id) {
        id -> Uuid,
        business_id -> Uuid,
        author_id -> Uuid,
        comment -> Text,
        /// Insertion order within the listing.
        seq -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listings bookmarked by a user. Read only from the service.
    saved_businesses (user_id, business_id) {
        user_id -> Uuid,
        business_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(businesses -> users (owner_id));
diesel::joinable!(business_subscribers -> businesses (business_id));
diesel::joinable!(reviews -> businesses (business_id));
diesel::joinable!(saved_businesses -> businesses (business_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    businesses,
    business_subscribers,
    reviews,
    saved_businesses,
);
