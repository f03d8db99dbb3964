use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use bzp_core::RoomCode;
use bzp_hosting::ParticipantId;
use std::collections::HashMap;

/// The caller's identity from the `player` query param, minted fresh
/// when absent so first-time clients need no prior handshake.
fn participant(query: &HashMap<String, String>) -> ParticipantId {
    query
        .get("player")
        .and_then(|p| p.parse().ok())
        .unwrap_or_default()
}

pub async fn create(
    lobby: web::Data<Lobby>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let host = participant(&query);
    match lobby.into_inner().create(host).await {
        Ok(code) => HttpResponse::Ok().json(serde_json::json!({
            "roomCode": code.to_string(),
            "playerId": host.to_string(),
        })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn join(
    lobby: web::Data<Lobby>,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let guest = participant(&query);
    let Ok(code) = path.into_inner().parse::<RoomCode>() else {
        return HttpResponse::BadRequest().body("invalid room code");
    };
    match lobby.join(&code, guest).await {
        Ok(slot) => HttpResponse::Ok().json(serde_json::json!({
            "roomCode": code.to_string(),
            "playerId": guest.to_string(),
            "slot": slot.to_string(),
        })),
        Err(e) => HttpResponse::NotFound().body(e.to_string()),
    }
}

pub async fn enter(
    lobby: web::Data<Lobby>,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let Ok(code) = path.into_inner().parse::<RoomCode>() else {
        return HttpResponse::BadRequest()
            .body("invalid room code")
            .map_into_right_body();
    };
    let Some(who) = query.get("player").and_then(|p| p.parse::<ParticipantId>().ok()) else {
        return HttpResponse::BadRequest()
            .body("missing player id")
            .map_into_right_body();
    };
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            match lobby.into_inner().bridge(code, who, session, stream).await {
                Ok(()) => response.map_into_left_body(),
                Err(e) => HttpResponse::NotFound()
                    .body(e.to_string())
                    .map_into_right_body(),
            }
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}
