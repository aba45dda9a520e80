//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler},
        cart::{add_to_cart_handler, download_shopping_cart_handler, remove_from_cart_handler},
        ingredients::{get_ingredient_handler, list_ingredients_handler},
        middleware::require_auth,
        recipes::{
            add_favorite_handler, create_recipe_handler, delete_recipe_handler,
            get_recipe_handler, list_recipes_handler, remove_favorite_handler,
            update_recipe_handler,
        },
        state::AppState,
        tags::{get_tag_handler, list_tags_handler},
        users::{
            get_user_handler, list_subscriptions_handler, list_users_handler, me_handler,
            set_password_handler, signup_handler, subscribe_handler, unsubscribe_handler,
        },
        ApiDoc,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    // The same adapter backs both ports; handlers that only aggregate the
    // cart see it through the narrow `CartSource` view.
    let app_state = Arc::new(AppState {
        store: db_adapter.clone(),
        cart: db_adapter,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/users", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/tags", get(list_tags_handler))
        .route("/api/tags/{id}", get(get_tag_handler))
        .route("/api/ingredients", get(list_ingredients_handler))
        .route("/api/ingredients/{id}", get(get_ingredient_handler))
        .route("/api/recipes", get(list_recipes_handler))
        .route("/api/recipes/{id}", get(get_recipe_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/users", get(list_users_handler))
        .route("/api/users/me", get(me_handler))
        .route("/api/users/subscriptions", get(list_subscriptions_handler))
        .route("/api/users/set_password", post(set_password_handler))
        .route("/api/users/{id}", get(get_user_handler))
        .route(
            "/api/users/{id}/subscribe",
            post(subscribe_handler).delete(unsubscribe_handler),
        )
        .route("/api/recipes", post(create_recipe_handler))
        .route(
            "/api/recipes/download_shopping_cart",
            get(download_shopping_cart_handler),
        )
        .route(
            "/api/recipes/{id}",
            patch(update_recipe_handler).delete(delete_recipe_handler),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(add_favorite_handler).delete(remove_favorite_handler),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(add_to_cart_handler).delete(remove_from_cart_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
