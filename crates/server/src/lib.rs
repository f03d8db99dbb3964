//! Backend server for live trivia betting matches.
//!
//! Thin actix-web surface over [`bzp_hosting::Lobby`]: room creation
//! and joining over HTTP, gameplay over a WebSocket per participant.
//!
//! ## Submodules
//!
//! - [`hosting`] — Room lifecycle and WebSocket entry handlers

pub mod hosting;

pub use hosting::Lobby;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use bzp_engine::MatchConfig;
use bzp_hosting::Deck;
use bzp_hosting::MemoryStats;
use bzp_hosting::QuestionSource;
use bzp_hosting::sample_deck;
use std::sync::Arc;

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Deck comes from DECK_PATH when set; otherwise the bundled starter
/// deck. A configured path that fails to load is a startup error, not
/// something to limp past.
fn deck() -> Arc<dyn QuestionSource> {
    match std::env::var("DECK_PATH") {
        Ok(path) => Arc::new(Deck::from_file(&path).expect("DECK_PATH must point to a valid deck")),
        Err(_) => Arc::new(sample_deck()),
    }
}

#[rustfmt::skip]
pub async fn run() -> Result<(), std::io::Error> {
    let lobby = web::Data::new(Lobby::new(
        MatchConfig::default(),
        deck(),
        Arc::new(MemoryStats::default()),
    ));
    log::info!("starting match server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(lobby.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/room")
                    .route("/create", web::post().to(hosting::handlers::create))
                    .route("/join/{code}", web::post().to(hosting::handlers::join))
                    .route("/enter/{code}", web::get().to(hosting::handlers::enter)),
            )
    })
    .workers(2)
    .bind(std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()))?
    .run()
    .await
}
