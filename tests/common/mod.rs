#![allow(dead_code)]

//! Shared test harness: in-memory repositories behind the real router.
//!
//! The fakes honor the same contracts as the PostgreSQL repositories
//! (uniqueness violations, secret-tour exclusion, list-query semantics), so
//! endpoint tests exercise handlers, middleware, services, and the query
//! builder end to end without a database.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::types::Json;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use tourbase::application::services::{AuthService, ReviewService, TourService, UserService};
use tourbase::domain::entities::{
    Difficulty, GeoPoint, NewReview, NewTour, NewUser, REVIEW_SCHEMA, Review, ReviewPatch, Role,
    TOUR_SCHEMA, Tour, TourPatch, USER_SCHEMA, User, UserPatch,
};
use tourbase::domain::query::{EntitySchema, FilterOp, FilterValue, ListQuery};
use tourbase::domain::rating_worker::run_rating_worker;
use tourbase::domain::repositories::{
    DifficultyStats, MonthStarts, RatingStats, ResourceRepository, ReviewRepository, TourDetail,
    TourRepository, UserRepository,
};
use tourbase::error::AppError;
use tourbase::infrastructure::email::{MailError, Mailer};
use tourbase::routes::api_router;
use tourbase::state::AppState;
use tourbase::utils::jwt::sign_token;
use tourbase::utils::password::hash_password;

pub const JWT_SECRET: &str = "integration-test-secret";

// ─── In-memory list query evaluation ─────────────────────────────────────────

/// Applies a refined list query to in-memory entities the way the SQL
/// composition applies it to rows.
pub fn apply_list_query<T: Serialize + Clone>(items: &[T], query: &ListQuery) -> Vec<T> {
    let mut pairs: Vec<(T, Value)> = items
        .iter()
        .map(|item| (item.clone(), serde_json::to_value(item).unwrap()))
        .collect();

    pairs.retain(|(_, value)| {
        query.filters.iter().all(|clause| {
            value
                .get(clause.column.name)
                .is_some_and(|field| matches_clause(field, clause.op, &clause.value))
        })
    });

    pairs.sort_by(|(_, a), (_, b)| {
        for clause in &query.sort {
            let ord = cmp_values(a.get(clause.column.name), b.get(clause.column.name));
            let ord = if clause.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    pairs
        .into_iter()
        .skip(query.offset() as usize)
        .take(query.limit as usize)
        .map(|(item, _)| item)
        .collect()
}

fn matches_clause(field: &Value, op: FilterOp, expected: &FilterValue) -> bool {
    let ord = match (expected, field) {
        (FilterValue::BigInt(e), Value::Number(_)) => {
            field.as_i64().map(|actual| actual.cmp(e))
        }
        (FilterValue::Integer(e), Value::Number(_)) => {
            field.as_i64().map(|actual| actual.cmp(&i64::from(*e)))
        }
        (FilterValue::Float(e), Value::Number(_)) => field
            .as_f64()
            .and_then(|actual| actual.partial_cmp(e)),
        (FilterValue::Bool(e), Value::Bool(actual)) => Some(actual.cmp(e)),
        (FilterValue::Text(e), Value::String(actual)) => Some(actual.cmp(e)),
        (FilterValue::Timestamp(e), Value::String(actual)) => {
            DateTime::parse_from_rfc3339(actual)
                .ok()
                .map(|actual| actual.with_timezone(&Utc).cmp(e))
        }
        _ => None,
    };

    let Some(ord) = ord else { return false };
    match op {
        FilterOp::Eq => ord == Ordering::Equal,
        FilterOp::Ne => ord != Ordering::Equal,
        FilterOp::Gt => ord == Ordering::Greater,
        FilterOp::Gte => ord != Ordering::Less,
        FilterOp::Lt => ord == Ordering::Less,
        FilterOp::Lte => ord != Ordering::Greater,
    }
}

fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(_)), Some(Value::Number(_))) => a
            .unwrap()
            .as_f64()
            .partial_cmp(&b.unwrap().as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

// ─── Fake user repository ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl FakeUserRepository {
    pub fn seed(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_lowercase(),
            photo: None,
            role,
            password_hash: hash_password(password),
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: base_time() + Duration::seconds(id),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn set_password_changed_at(&self, id: i64, changed_at: DateTime<Utc>) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_changed_at = Some(changed_at);
        }
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let email = new_user.email.to_lowercase();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::duplicate(
                "Duplicate field value",
                json!({ "constraint": "users_email_key" }),
            ));
        }

        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let user = User {
            id,
            name: new_user.name,
            email,
            photo: new_user.photo,
            role: new_user.role,
            password_hash: new_user.password_hash,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: base_time() + Duration::seconds(id),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.password_reset_token.as_deref() == Some(token_hash)
                    && u.password_reset_expires.is_some_and(|expires| expires > now)
            })
            .cloned())
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.password_changed_at = Some(changed_at);
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_reset_token = Some(token_hash.to_string());
            user.password_reset_expires = Some(expires_at);
        }
        Ok(())
    }

    async fn clear_reset_token(&self, user_id: i64) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_reset_token = None;
            user.password_reset_expires = None;
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.password_changed_at = Some(changed_at);
            user.password_reset_token = None;
            user.password_reset_expires = None;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for FakeUserRepository {
    type Entity = User;
    type Create = NewUser;
    type Patch = UserPatch;

    fn schema(&self) -> &'static EntitySchema {
        &USER_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().unwrap().clone();
        Ok(apply_list_query(&users, query))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.get(id))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        UserRepository::create(self, new_user).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email.to_lowercase();
        }
        if let Some(photo) = patch.photo {
            user.photo = photo;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

// ─── Fake tour repository ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeTourRepository {
    tours: Mutex<Vec<Tour>>,
    next_id: AtomicI64,
}

pub struct TourSeed {
    pub name: &'static str,
    pub price: f64,
    pub difficulty: Difficulty,
    pub secret: bool,
    pub duration: i32,
    pub ratings_average: f64,
}

impl Default for TourSeed {
    fn default() -> Self {
        Self {
            name: "The Forest Hiker",
            price: 497.0,
            difficulty: Difficulty::Easy,
            secret: false,
            duration: 7,
            ratings_average: 4.5,
        }
    }
}

impl FakeTourRepository {
    pub fn seed(&self, seed: TourSeed) -> Tour {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let tour = Tour {
            id,
            name: seed.name.to_string(),
            slug: seed.name.to_lowercase().replace(' ', "-"),
            duration: seed.duration,
            max_group_size: 25,
            difficulty: seed.difficulty,
            ratings_average: seed.ratings_average,
            ratings_quantity: 0,
            price: seed.price,
            price_discount: None,
            summary: "A test tour".to_string(),
            description: None,
            image_cover: "cover.jpg".to_string(),
            images: vec![],
            created_at: base_time() + Duration::seconds(id),
            start_dates: vec![],
            secret_tour: seed.secret,
            start_location: Json(GeoPoint {
                coordinates: [-115.57, 51.17],
                address: None,
                description: None,
            }),
            locations: Json(vec![]),
            guides: vec![],
        };
        self.tours.lock().unwrap().push(tour.clone());
        tour
    }

    pub fn get(&self, id: i64) -> Option<Tour> {
        self.tours.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait]
impl ResourceRepository for FakeTourRepository {
    type Entity = Tour;
    type Create = NewTour;
    type Patch = TourPatch;

    fn schema(&self) -> &'static EntitySchema {
        &TOUR_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Tour>, AppError> {
        let tours: Vec<Tour> = self
            .tours
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.secret_tour)
            .cloned()
            .collect();
        Ok(apply_list_query(&tours, query))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        Ok(self.get(id).filter(|t| !t.secret_tour))
    }

    async fn create(&self, new_tour: NewTour) -> Result<Tour, AppError> {
        let mut tours = self.tours.lock().unwrap();
        if tours.iter().any(|t| t.name == new_tour.name) {
            return Err(AppError::duplicate(
                "Duplicate field value",
                json!({ "constraint": "tours_name_key" }),
            ));
        }

        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let tour = Tour {
            id,
            name: new_tour.name,
            slug: new_tour.slug,
            duration: new_tour.duration,
            max_group_size: new_tour.max_group_size,
            difficulty: new_tour.difficulty,
            ratings_average: 4.5,
            ratings_quantity: 0,
            price: new_tour.price,
            price_discount: new_tour.price_discount,
            summary: new_tour.summary,
            description: new_tour.description,
            image_cover: new_tour.image_cover,
            images: new_tour.images,
            created_at: base_time() + Duration::seconds(id),
            start_dates: new_tour.start_dates,
            secret_tour: new_tour.secret_tour,
            start_location: Json(new_tour.start_location),
            locations: Json(new_tour.locations),
            guides: new_tour.guides,
        };
        tours.push(tour.clone());
        Ok(tour)
    }

    async fn update(&self, id: i64, patch: TourPatch) -> Result<Option<Tour>, AppError> {
        let mut tours = self.tours.lock().unwrap();
        let Some(tour) = tours.iter_mut().find(|t| t.id == id && !t.secret_tour) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            tour.name = name;
        }
        if let Some(slug) = patch.slug {
            tour.slug = slug;
        }
        if let Some(duration) = patch.duration {
            tour.duration = duration;
        }
        if let Some(max_group_size) = patch.max_group_size {
            tour.max_group_size = max_group_size;
        }
        if let Some(difficulty) = patch.difficulty {
            tour.difficulty = difficulty;
        }
        if let Some(price) = patch.price {
            tour.price = price;
        }
        if let Some(discount) = patch.price_discount {
            tour.price_discount = discount;
        }
        if let Some(summary) = patch.summary {
            tour.summary = summary;
        }
        if let Some(description) = patch.description {
            tour.description = description;
        }
        if let Some(image_cover) = patch.image_cover {
            tour.image_cover = image_cover;
        }
        if let Some(images) = patch.images {
            tour.images = images;
        }
        if let Some(start_dates) = patch.start_dates {
            tour.start_dates = start_dates;
        }
        if let Some(secret_tour) = patch.secret_tour {
            tour.secret_tour = secret_tour;
        }
        if let Some(start_location) = patch.start_location {
            tour.start_location = Json(start_location);
        }
        if let Some(locations) = patch.locations {
            tour.locations = Json(locations);
        }
        if let Some(guides) = patch.guides {
            tour.guides = guides;
        }
        Ok(Some(tour.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tours = self.tours.lock().unwrap();
        let before = tours.len();
        tours.retain(|t| t.id != id || t.secret_tour);
        Ok(tours.len() < before)
    }
}

#[async_trait]
impl TourRepository for FakeTourRepository {
    async fn find_detailed(&self, id: i64) -> Result<Option<TourDetail>, AppError> {
        Ok(self.get(id).filter(|t| !t.secret_tour).map(|tour| TourDetail {
            tour,
            guides: vec![],
            reviews: vec![],
        }))
    }

    async fn stats_by_difficulty(&self) -> Result<Vec<DifficultyStats>, AppError> {
        let tours = self.tours.lock().unwrap();
        let mut grouped: HashMap<&'static str, Vec<&Tour>> = HashMap::new();
        for tour in tours.iter().filter(|t| !t.secret_tour && t.ratings_average >= 4.5) {
            let key = match tour.difficulty {
                Difficulty::Easy => "easy",
                Difficulty::Medium => "medium",
                Difficulty::Difficult => "difficult",
            };
            grouped.entry(key).or_default().push(tour);
        }

        let mut stats: Vec<DifficultyStats> = grouped
            .into_values()
            .map(|group| {
                let n = group.len() as f64;
                DifficultyStats {
                    difficulty: group[0].difficulty,
                    num_tours: group.len() as i64,
                    num_ratings: group.iter().map(|t| i64::from(t.ratings_quantity)).sum(),
                    avg_rating: group.iter().map(|t| t.ratings_average).sum::<f64>() / n,
                    avg_price: group.iter().map(|t| t.price).sum::<f64>() / n,
                    min_price: group.iter().map(|t| t.price).fold(f64::MAX, f64::min),
                    max_price: group.iter().map(|t| t.price).fold(f64::MIN, f64::max),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.avg_price.partial_cmp(&b.avg_price).unwrap());
        Ok(stats)
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthStarts>, AppError> {
        let tours = self.tours.lock().unwrap();
        let mut by_month: HashMap<i32, (i64, Vec<String>)> = HashMap::new();
        for tour in tours.iter().filter(|t| !t.secret_tour) {
            for date in &tour.start_dates {
                if date.format("%Y").to_string() == year.to_string() {
                    let month: i32 = date.format("%m").to_string().parse().unwrap();
                    let entry = by_month.entry(month).or_default();
                    entry.0 += 1;
                    entry.1.push(tour.name.clone());
                }
            }
        }

        let mut plan: Vec<MonthStarts> = by_month
            .into_iter()
            .map(|(month, (num_tour_starts, tours))| MonthStarts {
                month,
                num_tour_starts,
                tours,
            })
            .collect();
        plan.sort_by(|a, b| {
            b.num_tour_starts
                .cmp(&a.num_tour_starts)
                .then(a.month.cmp(&b.month))
        });
        plan.truncate(6);
        Ok(plan)
    }

    async fn within_radius(
        &self,
        lng: f64,
        lat: f64,
        radius_radians: f64,
    ) -> Result<Vec<Tour>, AppError> {
        let tours = self.tours.lock().unwrap();
        Ok(tours
            .iter()
            .filter(|t| !t.secret_tour)
            .filter(|t| {
                let [tour_lng, tour_lat] = t.start_location.0.coordinates;
                let angle = (lat.to_radians().sin() * tour_lat.to_radians().sin()
                    + lat.to_radians().cos()
                        * tour_lat.to_radians().cos()
                        * (tour_lng.to_radians() - lng.to_radians()).cos())
                .clamp(-1.0, 1.0)
                .acos();
                angle <= radius_radians
            })
            .cloned()
            .collect())
    }

    async fn update_rating_stats(
        &self,
        tour_id: i64,
        quantity: i64,
        average: f64,
    ) -> Result<(), AppError> {
        let mut tours = self.tours.lock().unwrap();
        if let Some(tour) = tours.iter_mut().find(|t| t.id == tour_id) {
            tour.ratings_quantity = quantity as i32;
            tour.ratings_average = average;
        }
        Ok(())
    }
}

// ─── Fake review repository ──────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeReviewRepository {
    reviews: Mutex<Vec<Review>>,
    next_id: AtomicI64,
}

impl FakeReviewRepository {
    pub fn all(&self) -> Vec<Review> {
        self.reviews.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceRepository for FakeReviewRepository {
    type Entity = Review;
    type Create = NewReview;
    type Patch = ReviewPatch;

    fn schema(&self) -> &'static EntitySchema {
        &REVIEW_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Review>, AppError> {
        let reviews = self.reviews.lock().unwrap().clone();
        Ok(apply_list_query(&reviews, query))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create(&self, new_review: NewReview) -> Result<Review, AppError> {
        let mut reviews = self.reviews.lock().unwrap();
        if reviews
            .iter()
            .any(|r| r.tour_id == new_review.tour_id && r.user_id == new_review.user_id)
        {
            return Err(AppError::duplicate(
                "Duplicate field value",
                json!({ "constraint": "reviews_tour_id_user_id_key" }),
            ));
        }

        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let review = Review {
            id,
            review: new_review.review,
            rating: new_review.rating,
            created_at: base_time() + Duration::seconds(id),
            tour_id: new_review.tour_id,
            user_id: new_review.user_id,
        };
        reviews.push(review.clone());
        Ok(review)
    }

    async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Option<Review>, AppError> {
        let mut reviews = self.reviews.lock().unwrap();
        let Some(review) = reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(text) = patch.review {
            review.review = text;
        }
        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        Ok(Some(review.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() < before)
    }
}

#[async_trait]
impl ReviewRepository for FakeReviewRepository {
    async fn rating_stats(&self, tour_id: i64) -> Result<Option<RatingStats>, AppError> {
        let reviews = self.reviews.lock().unwrap();
        let ratings: Vec<i32> = reviews
            .iter()
            .filter(|r| r.tour_id == tour_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(None);
        }
        Ok(Some(RatingStats {
            quantity: ratings.len() as i64,
            average: f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64,
        }))
    }
}

// ─── Mailers ─────────────────────────────────────────────────────────────────

/// Records every message instead of sending it.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl CapturingMailer {
    pub fn last_message(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, message)| message.clone())
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), message.to_string()));
        Ok(())
    }
}

/// Always fails, for the forgot-password failure path.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _message: &str) -> Result<(), MailError> {
        Err(MailError::Rejected(502))
    }
}

// ─── App assembly ────────────────────────────────────────────────────────────

pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<FakeUserRepository>,
    pub tours: Arc<FakeTourRepository>,
    pub reviews: Arc<FakeReviewRepository>,
    pub outbox: Arc<CapturingMailer>,
}

/// Builds the full router over in-memory repositories and spawns the rating
/// aggregation worker, mirroring `server::run`.
pub fn spawn_app() -> TestApp {
    let outbox = Arc::new(CapturingMailer::default());
    let app = spawn_app_with_mailer(outbox.clone());
    TestApp { outbox, ..app }
}

pub fn spawn_app_with_mailer(mailer: Arc<dyn Mailer>) -> TestApp {
    let users = Arc::new(FakeUserRepository::default());
    let tours = Arc::new(FakeTourRepository::default());
    let reviews = Arc::new(FakeReviewRepository::default());

    let (rating_tx, rating_rx) = mpsc::channel(64);
    tokio::spawn(run_rating_worker(
        rating_rx,
        reviews.clone(),
        tours.clone(),
    ));

    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        mailer,
        JWT_SECRET.to_string(),
        24,
        "http://localhost:3000".to_string(),
    ));
    let tour_service = Arc::new(TourService::new(tours.clone(), tours.clone()));
    let user_service = Arc::new(UserService::new(users.clone()));
    let review_service = Arc::new(ReviewService::new(reviews.clone(), rating_tx.clone()));

    let state = AppState {
        auth_service,
        tour_service,
        user_service,
        review_service,
        rating_tx,
    };

    let server = TestServer::new(api_router(state)).unwrap();

    TestApp {
        server,
        users,
        tours,
        reviews,
        outbox: Arc::new(CapturingMailer::default()),
    }
}

/// Bearer header value for a user, signed with the test secret.
pub fn bearer_for(user: &User) -> String {
    format!("Bearer {}", sign_token(user.id, JWT_SECRET, 24).unwrap())
}

/// Polls until the condition holds, for asserting on the asynchronous
/// rating recomputation.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}
