//! Tests for the listing service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockBusinessRepository, MockNotificationPublisher, MockUserRepository,
};
use crate::domain::{
    BusinessEventKind, Email, ErrorCode, PasswordHash, Plan, Ref, Role, UserName, UserSummary,
};

type Service =
    ListingService<MockBusinessRepository, MockUserRepository, MockNotificationPublisher>;

fn service(
    businesses: MockBusinessRepository,
    users: MockUserRepository,
    notifications: MockNotificationPublisher,
) -> Service {
    ListingService::new(
        Arc::new(businesses),
        Arc::new(users),
        Arc::new(notifications),
        Arc::new(DefaultClock),
    )
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn user(name: &str, plan: Plan, role: Role) -> User {
    let now = Utc::now();
    User {
        id: UserId::random(),
        name: UserName::new(name).expect("valid name"),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("valid email"),
        password_hash: PasswordHash::from_encoded("hash"),
        plan,
        role,
        saved_businesses: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn business_owned_by(owner: &User) -> Business {
    let now = Utc::now();
    Business {
        id: BusinessId::random(),
        owner: owner.id,
        name: "Harbour Books".into(),
        description: "Second-hand books".into(),
        category: "Retail".into(),
        subscribers: Vec::new(),
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn users_resolving(known: Vec<UserSummary>) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_summaries()
        .returning(move |_| Ok(known.clone()));
    users
}

fn silent_publisher() -> MockNotificationPublisher {
    let mut publisher = MockNotificationPublisher::new();
    publisher.expect_publish().never();
    publisher
}

#[fixture]
fn owner() -> User {
    user("Olive", Plan::Standard, Role::User)
}

#[fixture]
fn stranger() -> User {
    user("Sam", Plan::Standard, Role::User)
}

#[rstest]
#[tokio::test]
async fn create_rejects_when_plan_limit_is_reached(owner: User) {
    let mut businesses = MockBusinessRepository::new();
    businesses.expect_count_owned_by().return_once(|_| Ok(1));
    businesses.expect_create().never();

    let draft = BusinessDraft::try_from_parts("Cafe", "Coffee", "Food").expect("valid draft");
    let error = service(businesses, MockUserRepository::new(), silent_publisher())
        .create(&owner, draft)
        .await
        .expect_err("quota reached");
    assert_eq!(error.code(), ErrorCode::QuotaExceeded);
}

#[rstest]
#[tokio::test]
async fn create_persists_and_resolves_owner(owner: User) {
    let owner_id = owner.id;
    let mut businesses = MockBusinessRepository::new();
    businesses.expect_count_owned_by().return_once(|_| Ok(0));
    businesses
        .expect_create()
        .withf(move |new: &NewBusiness| new.owner == owner_id && new.draft.name == "Cafe")
        .return_once(|new| {
            Ok(Business {
                id: new.id,
                owner: new.owner,
                name: new.draft.name.clone(),
                description: new.draft.description.clone(),
                category: new.draft.category.clone(),
                subscribers: Vec::new(),
                reviews: Vec::new(),
                created_at: new.created_at,
                updated_at: new.created_at,
            })
        });

    let draft = BusinessDraft::try_from_parts("Cafe", "Coffee", "Food").expect("valid draft");
    let view = service(
        businesses,
        users_resolving(vec![owner.summary()]),
        silent_publisher(),
    )
    .create(&owner, draft)
    .await
    .expect("created");
    assert_eq!(view.owner, Ref::Resolved(owner.summary()));
}

#[rstest]
#[tokio::test]
async fn update_by_non_owner_is_forbidden_and_silent(owner: User, stranger: User) {
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses.expect_update().never();

    let error = service(businesses, MockUserRepository::new(), silent_publisher())
        .update(&stranger, &id, BusinessPatch::default())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_publishes_one_event_with_new_name(owner: User) {
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut renamed = business.clone();
    renamed.name = "Harbour Books & Maps".into();
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses
        .expect_update()
        .return_once(move |_, _, _| Ok(Some(renamed)));
    let mut publisher = MockNotificationPublisher::new();
    publisher
        .expect_publish()
        .withf(move |event: &BusinessEvent| {
            event.kind == BusinessEventKind::Update
                && event.business_id == id
                && event.business_name == "Harbour Books & Maps"
        })
        .times(1)
        .return_const(2_usize);

    let patch = BusinessPatch::try_from_parts(Some("Harbour Books & Maps"), None, None)
        .expect("valid patch");
    let view = service(businesses, users_resolving(vec![]), publisher)
        .update(&owner, &id, patch)
        .await
        .expect("updated");
    assert_eq!(view.name, "Harbour Books & Maps");
    assert_eq!(view.owner, Ref::Reference { id: owner.id });
}

#[rstest]
#[tokio::test]
async fn delete_publishes_even_when_nobody_listens(owner: User) {
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses.expect_delete().return_once(|_| Ok(true));
    let mut publisher = MockNotificationPublisher::new();
    publisher
        .expect_publish()
        .withf(|event: &BusinessEvent| {
            event.kind == BusinessEventKind::Delete && event.business_name == "Harbour Books"
        })
        .times(1)
        .return_const(0_usize);

    service(businesses, MockUserRepository::new(), publisher)
        .delete(&owner, &id)
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn admin_may_delete_any_listing(owner: User) {
    let admin = user("Root", Plan::Standard, Role::Admin);
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses.expect_delete().return_once(|_| Ok(true));
    let mut publisher = MockNotificationPublisher::new();
    publisher.expect_publish().times(1).return_const(1_usize);

    service(businesses, MockUserRepository::new(), publisher)
        .delete(&admin, &id)
        .await
        .expect("admin delete");
}

#[rstest]
#[tokio::test]
async fn owner_cannot_subscribe_or_review(owner: User) {
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(Some(business.clone())));
    businesses.expect_add_subscriber().never();
    businesses.expect_append_review().never();
    let listings = service(businesses, MockUserRepository::new(), silent_publisher());

    let subscribe = listings
        .subscribe(&owner, &id)
        .await
        .expect_err("self subscribe");
    let comment = ReviewComment::new("Great service").expect("valid comment");
    let review = listings
        .add_review(&owner, &id, comment)
        .await
        .expect_err("self review");
    assert_eq!(subscribe.code(), ErrorCode::Forbidden);
    assert_eq!(review.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn subscribe_stamps_the_service_clock(owner: User, stranger: User) {
    let subscribed_at = Utc
        .with_ymd_and_hms(2026, 5, 4, 12, 30, 0)
        .single()
        .expect("valid fixture timestamp");
    let business = business_owned_by(&owner);
    let id = business.id;
    let fan = stranger.id;
    let mut subscribed = business.clone();
    subscribed.subscribers.push(fan);
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses
        .expect_add_subscriber()
        .withf(move |_, user, at| *user == fan && *at == subscribed_at)
        .times(1)
        .return_once(move |_, _, _| Ok(Some(subscribed)));
    let listings = ListingService::new(
        Arc::new(businesses),
        Arc::new(users_resolving(vec![owner.summary(), stranger.summary()])),
        Arc::new(silent_publisher()),
        Arc::new(FixedClock(subscribed_at)),
    );

    let view = listings
        .subscribe(&stranger, &id)
        .await
        .expect("subscribed");
    assert_eq!(view.subscribers.len(), 1);
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_review_is_not_found_before_authorization(owner: User, stranger: User) {
    let business = business_owned_by(&owner);
    let id = business.id;
    let mut businesses = MockBusinessRepository::new();
    businesses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(business)));
    businesses.expect_remove_review().never();

    let error = service(businesses, MockUserRepository::new(), silent_publisher())
        .delete_review(&stranger, &id, &ReviewId::random())
        .await
        .expect_err("missing review");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Review not found");
}

#[rstest]
#[tokio::test]
async fn unknown_business_is_not_found(stranger: User) {
    let mut businesses = MockBusinessRepository::new();
    businesses.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(businesses, MockUserRepository::new(), silent_publisher())
        .subscribe(&stranger, &BusinessId::random())
        .await
        .expect_err("missing business");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Business not found");
}

#[rstest]
#[tokio::test]
async fn moderation_requires_admin(stranger: User) {
    let mut businesses = MockBusinessRepository::new();
    businesses.expect_list_reviews().never();

    let error = service(businesses, MockUserRepository::new(), silent_publisher())
        .moderation_reviews(&stranger, ReviewFilter::default())
        .await
        .expect_err("not admin");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn saved_businesses_skip_lookup_when_empty(stranger: User) {
    let mut users = MockUserRepository::new();
    let found = stranger.clone();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    let mut businesses = MockBusinessRepository::new();
    businesses.expect_find_many().never();

    let saved = service(businesses, users, silent_publisher())
        .saved_businesses(&stranger.id)
        .await
        .expect("saved list");
    assert!(saved.is_empty());
}
