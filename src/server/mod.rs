//! HTTP surface: image API, static image files and CORS

mod error;
pub mod routes;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{web, App, HttpServer};
use tracing::info;

use crate::gallery::Gallery;
use crate::Config;

/// Request defaults shared by the handlers
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub default_page_size: u32,
}

impl From<&Config> for ApiSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_page_size: config.server.default_page_size.max(1),
        }
    }
}

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

/// Serve until the process is stopped
pub async fn run(gallery: Gallery, config: &Config) -> std::io::Result<()> {
    let settings = web::Data::new(ApiSettings::from(config));
    let image_root = gallery.image_root().to_path_buf();
    let gallery = web::Data::new(gallery);
    let server_config = config.server.clone();

    let (host, port) = config.bind_address();
    info!(
        host = %host,
        port,
        static_prefix = %server_config.static_prefix,
        "starting HTTP server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&server_config.allowed_origins))
            .app_data(gallery.clone())
            .app_data(settings.clone())
            .configure(routes::configure)
            .service(Files::new(&server_config.static_prefix, image_root.clone()))
    })
    .bind((host, port))?
    .run()
    .await
}
