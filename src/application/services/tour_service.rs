//! Tour CRUD, aggregates, and geo lookups.

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::services::resource_service::ResourceService;
use crate::domain::entities::{NewTour, Tour, TourPatch};
use crate::domain::query::ListQuery;
use crate::domain::repositories::{
    DifficultyStats, DynResourceRepository, MonthStarts, TourDetail, TourRepository,
};
use crate::error::AppError;
use crate::utils::slug::slugify;

/// Radius conversion divisors: distance over earth radius gives the
/// great-circle central angle in radians.
const EARTH_RADIUS_MI: f64 = 3963.2;
const EARTH_RADIUS_KM: f64 = 6378.1;

/// Service for tour management.
///
/// Applies the tour lifecycle rules explicitly around persistence: the slug
/// is rederived from the name on every create and name change, and the
/// price-discount invariant is validated against the effective price before
/// any write.
pub struct TourService {
    resource: ResourceService<Tour, NewTour, TourPatch>,
    tours: Arc<dyn TourRepository>,
}

impl TourService {
    pub fn new(
        repository: DynResourceRepository<Tour, NewTour, TourPatch>,
        tours: Arc<dyn TourRepository>,
    ) -> Self {
        Self {
            resource: ResourceService::new(repository),
            tours,
        }
    }

    /// Lists tours through the query builder. Secret tours never appear.
    pub async fn list(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(Vec<Tour>, ListQuery), AppError> {
        self.resource.list(params, None).await
    }

    /// Fetches one tour with its guides and reviews populated.
    pub async fn get_detailed(&self, id: i64) -> Result<TourDetail, AppError> {
        self.tours.find_detailed(id).await?.ok_or_else(|| {
            AppError::not_found("No tour found with that id", json!({ "id": id }))
        })
    }

    pub async fn create(&self, mut new_tour: NewTour) -> Result<Tour, AppError> {
        new_tour.slug = slugify(&new_tour.name);
        check_price_discount(new_tour.price, new_tour.price_discount)?;
        self.resource.create(new_tour).await
    }

    pub async fn update(&self, id: i64, mut patch: TourPatch) -> Result<Tour, AppError> {
        if let Some(name) = &patch.name {
            patch.slug = Some(slugify(name));
        }

        // The discount invariant holds against the price after the patch, so
        // a partial update must be checked against the merged values.
        if patch.price.is_some() || matches!(patch.price_discount, Some(Some(_))) {
            let current = self.resource.get(id).await?;
            let price = patch.price.unwrap_or(current.price);
            let discount = match patch.price_discount {
                Some(discount) => discount,
                None => current.price_discount,
            };
            check_price_discount(price, discount)?;
        }

        self.resource.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.resource.delete(id).await
    }

    /// Rating/price aggregates per difficulty over well-rated tours.
    pub async fn stats(&self) -> Result<Vec<DifficultyStats>, AppError> {
        self.tours.stats_by_difficulty().await
    }

    /// Busiest months of a year by tour start count.
    pub async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthStarts>, AppError> {
        self.tours.monthly_plan(year).await
    }

    /// Tours starting within `distance` of a point, `unit` being `mi` or
    /// `km`.
    pub async fn within(
        &self,
        distance: f64,
        lat: f64,
        lng: f64,
        unit: &str,
    ) -> Result<Vec<Tour>, AppError> {
        let radius = match unit {
            "mi" => distance / EARTH_RADIUS_MI,
            "km" => distance / EARTH_RADIUS_KM,
            _ => {
                return Err(AppError::bad_request(
                    "Unit must be `mi` or `km`",
                    json!({ "unit": unit }),
                ));
            }
        };

        self.tours.within_radius(lng, lat, radius).await
    }
}

fn check_price_discount(price: f64, discount: Option<f64>) -> Result<(), AppError> {
    if let Some(discount) = discount
        && discount >= price
    {
        return Err(AppError::bad_request(
            format!("Discount price ({discount}) cannot be equal to or greater than price"),
            json!({ "price": price, "price_discount": discount }),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Difficulty, GeoPoint, TOUR_SCHEMA};
    use crate::domain::query::EntitySchema;
    use crate::domain::repositories::{MockTourRepository, ResourceRepository};
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::types::Json;
    use std::sync::Mutex;

    fn tour_from(new_tour: &NewTour) -> Tour {
        Tour {
            id: 1,
            name: new_tour.name.clone(),
            slug: new_tour.slug.clone(),
            duration: new_tour.duration,
            max_group_size: new_tour.max_group_size,
            difficulty: new_tour.difficulty,
            ratings_average: 4.5,
            ratings_quantity: 0,
            price: new_tour.price,
            price_discount: new_tour.price_discount,
            summary: new_tour.summary.clone(),
            description: new_tour.description.clone(),
            image_cover: new_tour.image_cover.clone(),
            images: new_tour.images.clone(),
            created_at: Utc::now(),
            start_dates: new_tour.start_dates.clone(),
            secret_tour: new_tour.secret_tour,
            start_location: Json(new_tour.start_location.clone()),
            locations: Json(new_tour.locations.clone()),
            guides: new_tour.guides.clone(),
        }
    }

    fn sample_new_tour() -> NewTour {
        NewTour {
            name: "The Forest Hiker".to_string(),
            slug: String::new(),
            duration: 7,
            max_group_size: 25,
            difficulty: Difficulty::Easy,
            price: 497.0,
            price_discount: None,
            summary: "Breathtaking hike".to_string(),
            description: None,
            image_cover: "cover.jpg".to_string(),
            images: vec![],
            start_dates: vec![],
            secret_tour: false,
            start_location: GeoPoint {
                coordinates: [-115.57, 51.17],
                address: None,
                description: None,
            },
            locations: vec![],
            guides: vec![],
        }
    }

    /// In-memory resource repository capturing writes for assertions.
    #[derive(Default)]
    struct FakeTourResource {
        current: Option<Tour>,
        created: Mutex<Option<NewTour>>,
        patched: Mutex<Option<TourPatch>>,
    }

    #[async_trait]
    impl ResourceRepository for FakeTourResource {
        type Entity = Tour;
        type Create = NewTour;
        type Patch = TourPatch;

        fn schema(&self) -> &'static EntitySchema {
            &TOUR_SCHEMA
        }

        async fn list(&self, _query: &ListQuery) -> Result<Vec<Tour>, AppError> {
            Ok(self.current.clone().into_iter().collect())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Tour>, AppError> {
            Ok(self.current.clone())
        }

        async fn create(&self, input: NewTour) -> Result<Tour, AppError> {
            let tour = tour_from(&input);
            *self.created.lock().unwrap() = Some(input);
            Ok(tour)
        }

        async fn update(&self, _id: i64, patch: TourPatch) -> Result<Option<Tour>, AppError> {
            *self.patched.lock().unwrap() = Some(patch);
            Ok(self.current.clone())
        }

        async fn delete(&self, _id: i64) -> Result<bool, AppError> {
            Ok(self.current.is_some())
        }
    }

    fn service_with(resource: FakeTourResource) -> (TourService, Arc<FakeTourResource>) {
        let resource = Arc::new(resource);
        let service = TourService::new(resource.clone(), Arc::new(MockTourRepository::new()));
        (service, resource)
    }

    #[tokio::test]
    async fn test_create_derives_slug_from_name() {
        let (service, resource) = service_with(FakeTourResource::default());

        let tour = service.create(sample_new_tour()).await.unwrap();

        assert_eq!(tour.slug, "the-forest-hiker");
        let created = resource.created.lock().unwrap();
        assert_eq!(created.as_ref().unwrap().slug, "the-forest-hiker");
    }

    #[tokio::test]
    async fn test_create_rejects_discount_not_below_price() {
        let (service, _) = service_with(FakeTourResource::default());

        let new_tour = NewTour {
            price: 100.0,
            price_discount: Some(100.0),
            ..sample_new_tour()
        };
        let err = service.create(new_tour).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_rederives_slug_on_rename() {
        let mut new_tour = sample_new_tour();
        new_tour.slug = "the-forest-hiker".to_string();
        let (service, resource) = service_with(FakeTourResource {
            current: Some(tour_from(&new_tour)),
            ..Default::default()
        });

        service
            .update(
                1,
                TourPatch {
                    name: Some("The Sea Explorer".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let patched = resource.patched.lock().unwrap();
        assert_eq!(
            patched.as_ref().unwrap().slug.as_deref(),
            Some("the-sea-explorer")
        );
    }

    #[tokio::test]
    async fn test_update_checks_discount_against_effective_price() {
        let mut new_tour = sample_new_tour();
        new_tour.price = 500.0;
        let (service, _) = service_with(FakeTourResource {
            current: Some(tour_from(&new_tour)),
            ..Default::default()
        });

        // New discount vs stored price.
        let err = service
            .update(
                1,
                TourPatch {
                    price_discount: Some(Some(600.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        // Price drop below an existing discount.
        let mut discounted = sample_new_tour();
        discounted.price = 500.0;
        discounted.price_discount = Some(400.0);
        let (service, _) = service_with(FakeTourResource {
            current: Some(tour_from(&discounted)),
            ..Default::default()
        });

        let err = service
            .update(
                1,
                TourPatch {
                    price: Some(300.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_within_converts_units_to_radians() {
        let resource = Arc::new(FakeTourResource::default());

        let mut tours = MockTourRepository::new();
        tours
            .expect_within_radius()
            .withf(|lng, lat, radius| {
                *lng == -115.0 && *lat == 51.0 && (*radius - 233.0 / 3963.2).abs() < 1e-12
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = TourService::new(resource, Arc::new(tours));
        service.within(233.0, 51.0, -115.0, "mi").await.unwrap();
    }

    #[tokio::test]
    async fn test_within_rejects_unknown_unit() {
        let (service, _) = service_with(FakeTourResource::default());
        let err = service.within(10.0, 51.0, -115.0, "furlongs").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
