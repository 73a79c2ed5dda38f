use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, BookingError};
use appointment_cell::services::{AdminService, RatingAggregator, ReviewService};
use provider_cell::models::{Provider, Weekday};
use provider_cell::services::ProviderService;
use shared_models::{AuthContext, NotificationKind};
use shared_store::Collection;
use shared_utils::test_utils::{
    hourly_template, next_date_on, provider_request, RecordingDispatcher,
};

struct ReviewHarness {
    providers: Arc<Collection<Provider>>,
    appointments: Arc<Collection<Appointment>>,
    review: ReviewService,
    notifications: tokio::sync::mpsc::UnboundedReceiver<shared_models::Notification>,
    provider: Provider,
}

async fn harness() -> ReviewHarness {
    let providers = Arc::new(Collection::new("providers"));
    let appointments = Arc::new(Collection::new("appointments"));

    let provider = ProviderService::new(Arc::clone(&providers))
        .register(provider_request(Uuid::new_v4(), hourly_template()))
        .await
        .unwrap();

    let (dispatcher, notifications) = RecordingDispatcher::new();
    let review = ReviewService::new(
        Arc::clone(&appointments),
        Arc::clone(&providers),
        dispatcher,
    );

    ReviewHarness {
        providers,
        appointments,
        review,
        notifications,
        provider,
    }
}

async fn seeded_appointment(h: &ReviewHarness, status: AppointmentStatus) -> Appointment {
    let created_at = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        provider_id: h.provider.id,
        service_id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        date: next_date_on(Weekday::Monday),
        time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        status,
        total_price: 45.0,
        notes: None,
        review: None,
        created_at,
        updated_at: created_at,
    };
    h.appointments
        .insert(appointment.id, appointment.clone())
        .await
        .unwrap();
    appointment
}

#[tokio::test]
async fn reviewing_a_completed_appointment_updates_the_average() {
    let mut h = harness().await;
    let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;
    let user = AuthContext::customer(appointment.user_id);

    let reviewed = h
        .review
        .attach_review(appointment.id, 4, Some("Spotless".to_string()), user)
        .await
        .unwrap();

    let review = reviewed.review.unwrap();
    assert_eq!(review.rating, 4);
    assert_eq!(review.comment.as_deref(), Some("Spotless"));

    let provider = h.providers.get(h.provider.id).await.unwrap();
    assert_eq!(provider.average_rating, 4.0);

    let notification = h.notifications.recv().await.unwrap();
    assert_eq!(notification.recipient_id, h.provider.owner_id);
    assert_eq!(notification.kind, NotificationKind::ReviewSubmitted);
}

#[tokio::test]
async fn average_is_the_rounded_mean_over_all_reviews() {
    let h = harness().await;

    for rating in [5, 4, 3] {
        let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;
        h.review
            .attach_review(appointment.id, rating, None, AuthContext::customer(appointment.user_id))
            .await
            .unwrap();
    }

    let provider = h.providers.get(h.provider.id).await.unwrap();
    assert_eq!(provider.average_rating, 4.0);

    // 4 and 5 average to 4.5; rounding keeps one decimal.
    let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;
    h.review
        .attach_review(appointment.id, 5, None, AuthContext::customer(appointment.user_id))
        .await
        .unwrap();
    let provider = h.providers.get(h.provider.id).await.unwrap();
    assert_eq!(provider.average_rating, 4.3);
}

#[tokio::test]
async fn providers_without_reviews_sit_at_zero() {
    let h = harness().await;
    seeded_appointment(&h, AppointmentStatus::Completed).await;

    let aggregator = RatingAggregator::new(Arc::clone(&h.appointments), Arc::clone(&h.providers));
    let average = aggregator.recompute(h.provider.id).await.unwrap();

    assert_eq!(average, 0.0);
    assert_matches!(
        aggregator.recompute(Uuid::new_v4()).await,
        Err(BookingError::ProviderNotFound)
    );
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let h = harness().await;
    let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;
    let user = AuthContext::customer(appointment.user_id);

    for rating in [0, 6] {
        assert_matches!(
            h.review.attach_review(appointment.id, rating, None, user).await,
            Err(BookingError::Validation(_)),
            "accepted rating {}",
            rating
        );
    }
}

#[tokio::test]
async fn only_completed_appointments_may_be_reviewed() {
    let h = harness().await;

    for status in [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
    ] {
        let appointment = seeded_appointment(&h, status).await;
        assert_matches!(
            h.review
                .attach_review(appointment.id, 5, None, AuthContext::customer(appointment.user_id))
                .await,
            Err(BookingError::NotCompleted)
        );
    }
}

#[tokio::test]
async fn second_reviews_are_rejected() {
    let h = harness().await;
    let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;
    let user = AuthContext::customer(appointment.user_id);

    h.review
        .attach_review(appointment.id, 5, None, user)
        .await
        .unwrap();

    assert_matches!(
        h.review.attach_review(appointment.id, 1, None, user).await,
        Err(BookingError::AlreadyReviewed)
    );

    // The original review survives.
    let stored = h.appointments.get(appointment.id).await.unwrap();
    assert_eq!(stored.review.unwrap().rating, 5);
}

#[tokio::test]
async fn only_the_appointments_user_may_review() {
    let h = harness().await;
    let appointment = seeded_appointment(&h, AppointmentStatus::Completed).await;

    assert_matches!(
        h.review
            .attach_review(appointment.id, 5, None, AuthContext::customer(Uuid::new_v4()))
            .await,
        Err(BookingError::Forbidden)
    );
    // Admins do not review on a user's behalf either.
    assert_matches!(
        h.review
            .attach_review(appointment.id, 5, None, AuthContext::admin(Uuid::new_v4()))
            .await,
        Err(BookingError::Forbidden)
    );
}

#[tokio::test]
async fn admin_removal_cascades_to_appointments() {
    let h = harness().await;
    seeded_appointment(&h, AppointmentStatus::Pending).await;
    seeded_appointment(&h, AppointmentStatus::Confirmed).await;

    let admin_service = AdminService::new(Arc::clone(&h.providers), Arc::clone(&h.appointments));
    let removed = admin_service
        .remove_provider(h.provider.id, AuthContext::admin(Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(removed.len(), 2);
    assert!(h.appointments.list().await.is_empty());
    assert_matches!(
        h.providers.get(h.provider.id).await,
        Err(shared_store::StoreError::NotFound)
    );
}

#[tokio::test]
async fn provider_removal_is_admin_only() {
    let h = harness().await;
    let admin_service = AdminService::new(Arc::clone(&h.providers), Arc::clone(&h.appointments));

    assert_matches!(
        admin_service
            .remove_provider(h.provider.id, AuthContext::provider(h.provider.owner_id))
            .await,
        Err(BookingError::Forbidden)
    );
    assert_matches!(
        admin_service
            .remove_provider(Uuid::new_v4(), AuthContext::admin(Uuid::new_v4()))
            .await,
        Err(BookingError::ProviderNotFound)
    );
}
