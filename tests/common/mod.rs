#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use carwash_backend::{
    entities::{
        booking::{self, BookingStatus},
        car_owner, review, service, shop_owner,
        user::{self, UserRole},
        vehicle,
    },
    routes,
    utils::jwt::create_token,
    AppState, Config,
};

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A user with its role profile and a valid session token.
pub struct Account {
    pub user: user::Model,
    pub profile_id: Uuid,
    pub token: String,
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        rate_limit_enabled: false,
        cookie_secure: false,
    }
}

async fn create_schema(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(car_owner::Entity),
        schema.create_table_from_entity(shop_owner::Entity),
        schema.create_table_from_entity(vehicle::Entity),
        schema.create_table_from_entity(service::Entity),
        schema.create_table_from_entity(booking::Entity),
        schema.create_table_from_entity(review::Entity),
    ];

    for statement in statements {
        db.execute(backend.build(&statement))
            .await
            .expect("create table");
    }
}

pub async fn setup() -> TestApp {
    let config = test_config();
    let db = Database::connect(config.database_url.as_str())
        .await
        .expect("connect to sqlite");
    create_schema(&db).await;

    let router = routes::create_router(AppState {
        db: db.clone(),
        config,
    });

    TestApp { router, db }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Insert a user and its role profile directly, skipping password hashing.
    pub async fn account(&self, role: UserRole, email: &str) -> Account {
        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("{} name", email)),
            email: Set(email.to_string()),
            phone: Set("555-0100".to_string()),
            password_hash: Set("unused".to_string()),
            role: Set(role),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .expect("insert user");

        let profile_id = Uuid::new_v4();
        match role {
            UserRole::CarOwner => {
                car_owner::ActiveModel {
                    id: Set(profile_id),
                    user_id: Set(user.id),
                    address: Set(None),
                    city: Set(None),
                    created_at: Set(now.into()),
                }
                .insert(&self.db)
                .await
                .expect("insert car owner");
            }
            UserRole::ShopOwner => {
                shop_owner::ActiveModel {
                    id: Set(profile_id),
                    user_id: Set(user.id),
                    shop_name: Set(format!("{} wash", email)),
                    address: Set(Some("1 Main St".to_string())),
                    city: Set(Some("Springfield".to_string())),
                    description: Set(None),
                    phone: Set(None),
                    created_at: Set(now.into()),
                }
                .insert(&self.db)
                .await
                .expect("insert shop owner");
            }
        }

        let token = create_token(user.id, &user.email, role, JWT_SECRET, 1).expect("token");
        Account {
            user,
            profile_id,
            token,
        }
    }

    pub async fn service(&self, shop_owner_id: Uuid, price: f64, active: bool) -> service::Model {
        service::ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_owner_id: Set(shop_owner_id),
            name: Set("Full wash".to_string()),
            description: Set(None),
            price: Set(price),
            duration_minutes: Set(45),
            is_active: Set(active),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .expect("insert service")
    }

    pub async fn vehicle(&self, car_owner_id: Uuid) -> vehicle::Model {
        vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            car_owner_id: Set(car_owner_id),
            make: Set("Toyota".to_string()),
            model: Set("Corolla".to_string()),
            year: Set(Some(2019)),
            color: Set(None),
            license_plate: Set("ABC123".to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .expect("insert vehicle")
    }

    pub async fn booking(
        &self,
        car_owner: &Account,
        service: &service::Model,
        vehicle: &vehicle::Model,
        status: BookingStatus,
    ) -> booking::Model {
        let now = Utc::now();
        booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            car_owner_id: Set(car_owner.profile_id),
            shop_owner_id: Set(service.shop_owner_id),
            service_id: Set(service.id),
            vehicle_id: Set(vehicle.id),
            status: Set(status),
            scheduled_at: Set((now + Duration::days(1)).into()),
            total_amount: Set(service.price),
            notes: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .expect("insert booking")
    }

    pub async fn review(&self, booking: &booking::Model, rating: i32) -> review::Model {
        review::ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_owner_id: Set(booking.shop_owner_id),
            car_owner_id: Set(booking.car_owner_id),
            booking_id: Set(booking.id),
            rating: Set(rating),
            comment: Set(Some("Spotless".to_string())),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .expect("insert review")
    }

    pub async fn booking_status(&self, id: Uuid) -> BookingStatus {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .expect("query booking")
            .expect("booking exists")
            .status
    }
}
