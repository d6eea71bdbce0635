use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use parking_lot::RwLock;
use serde::Deserialize;
use smartcart_core::{Catalog, CatalogAnalytics, ProductId, QueryContext, RecommendationEngine};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared, read-mostly state behind every handler
pub struct AppState {
    catalog: Arc<Catalog>,
    engine: RecommendationEngine,
    analytics: RwLock<Option<Arc<CatalogAnalytics>>>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_engine(catalog, RecommendationEngine::default())
    }

    pub fn with_engine(catalog: Arc<Catalog>, engine: RecommendationEngine) -> Self {
        Self {
            catalog,
            engine,
            analytics: RwLock::new(None),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Analytics are computed on first use; the catalog never changes
    pub fn analytics(&self) -> Arc<CatalogAnalytics> {
        if let Some(cached) = self.analytics.read().as_ref() {
            return cached.clone();
        }
        let mut slot = self.analytics.write();
        slot.get_or_insert_with(|| {
            debug!("Computing catalog analytics");
            Arc::new(CatalogAnalytics::compute(&self.catalog))
        })
        .clone()
    }
}

/// Query-string form of a recommendation request.
///
/// Empty `category`/`brand` values mean "no filter" and a non-positive
/// `limit` falls back to the default, matching what HTML forms send.
#[derive(Debug, Default, Deserialize)]
struct RecommendParams {
    query: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    min_rating: Option<f64>,
    limit: Option<i64>,
}

impl RecommendParams {
    fn into_context(self) -> QueryContext {
        QueryContext {
            query: self.query,
            category: self.category.filter(|c| !c.is_empty()),
            brand: self.brand.filter(|b| !b.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            limit: self.limit.filter(|&l| l > 0).map(|l| l as usize),
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(catalog: Arc<Catalog>, host: &str, port: u16) -> std::io::Result<()> {
        let state = web::Data::new(AppState::new(catalog));
        info!("Serving {} products on {}:{}", state.catalog().len(), host, port);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(Self::configure)
        })
        .bind((host, port))?
        .run()
        .await
    }

    /// Register every route; expects `web::Data<AppState>` in app data
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(root))
            .route("/api/health", web::get().to(health))
            .route("/api/recommend", web::get().to(recommend))
            .route("/api/analytics", web::get().to(analytics))
            .route("/api/categories", web::get().to(categories))
            .route("/api/brands", web::get().to(brands))
            .route("/api/products/{id}", web::get().to(get_product));
    }
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "SmartCart API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "recommend": "/api/recommend",
            "analytics": "/api/analytics",
            "categories": "/api/categories",
            "brands": "/api/brands",
            "product": "/api/products/{id}"
        }
    })))
}

async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let catalog = state.catalog();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "products_loaded": catalog.len(),
        "categories": catalog.categories().len(),
        "brands": catalog.brands().len()
    })))
}

async fn recommend(
    state: web::Data<AppState>,
    params: web::Query<RecommendParams>,
) -> ActixResult<HttpResponse> {
    let ctx = params.into_inner().into_context();
    let result = state.engine.recommend(state.catalog(), &ctx);
    Ok(HttpResponse::Ok().json(result))
}

async fn analytics(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let analytics = state.analytics();
    Ok(HttpResponse::Ok().json(&*analytics))
}

async fn categories(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "categories": state.catalog().categories()
    })))
}

async fn brands(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "brands": state.catalog().brands()
    })))
}

async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id: ProductId = match path.into_inner().parse() {
        Ok(id) => id,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid product id"
            })));
        }
    };

    match state.catalog().require(id) {
        Ok(product) => Ok(HttpResponse::Ok().json(product)),
        Err(e) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        }))),
    }
}
