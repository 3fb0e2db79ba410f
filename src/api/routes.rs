use actix_web::{delete, get, post, put, web, HttpResponse, Result as WebResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::ads::{self, Advertisement};
use crate::advice::composer;
use crate::advice::AdviceProvider;
use crate::api::active::ActiveRequests;
use crate::api::models::{
    geo_from, AskAdviceRequest, AskAdviceResponse, CreateSessionRequest, PaginationQuery,
    PlacesQuery, SaveProfileResponse,
};
use crate::config::AppConfig;
use crate::db::{service::DbService, DbPool};
use crate::places;
use crate::profile::{age_is_valid, weight_is_valid, Profile};

// --- Sessions ---

#[post("")]
pub async fn create_session(
    pool: web::Data<DbPool>,
    req: web::Json<CreateSessionRequest>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();
    let req = req.into_inner();

    match DbService::insert_session(&conn, &req.name, req.metadata) {
        Ok(session) => Ok(HttpResponse::Created().json(session)),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[get("")]
pub async fn list_sessions(
    pool: web::Data<DbPool>,
    query: web::Query<PaginationQuery>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();

    match DbService::list_sessions(&conn, query.limit, query.offset) {
        Ok(sessions) => Ok(HttpResponse::Ok().json(sessions)),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[get("/{id}")]
pub async fn get_session(
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();

    match DbService::get_session(&conn, id.into_inner()) {
        Ok(Some(session)) => Ok(HttpResponse::Ok().json(session)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[delete("/{id}")]
pub async fn delete_session(
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();
    let id = id.into_inner();

    // Check if exists first for better 404 handling
    if DbService::get_session(&conn, id).unwrap_or(None).is_none() {
        return Ok(HttpResponse::NotFound().finish());
    }

    match DbService::delete_session(&conn, id) {
        Ok(_) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[get("/{id}/turns")]
pub async fn get_turns(
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();

    match DbService::get_turns(&conn, id.into_inner(), query.limit, query.offset) {
        Ok(turns) => Ok(HttpResponse::Ok().json(turns)),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[get("/{id}/export")]
pub async fn export_session(
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();
    let id = id.into_inner();

    let session = match DbService::get_session(&conn, id) {
        Ok(Some(s)) => s,
        Ok(None) => return Ok(HttpResponse::NotFound().finish()),
        Err(e) => return Ok(HttpResponse::InternalServerError().body(e.to_string())),
    };

    let turns = DbService::get_turns(&conn, id, 1000, 0).unwrap_or_default();

    let mut export = String::new();
    export.push_str(&format!("Session: {}\n", session.name));
    export.push_str(&format!("ID: {}\n", session.id));
    export.push_str(&format!("Created At: {}\n", session.created_at));
    export.push_str("---\n");

    for t in turns {
        export.push_str(&format!("[{}]: {}\n", t.role.to_uppercase(), t.content));
        for s in &t.sources {
            export.push_str(&format!("  source: {} <{}>\n", s.title, s.uri));
        }
        export.push_str("---\n");
    }

    Ok(HttpResponse::Ok()
        .content_type("text/plain")
        .insert_header(("Content-Disposition", format!("attachment; filename=\"session_{}.txt\"", id)))
        .body(export))
}

// --- Advice ---

#[post("/{id}/advice")]
pub async fn ask_advice(
    pool: web::Data<DbPool>,
    provider: web::Data<Arc<dyn AdviceProvider>>,
    active: web::Data<ActiveRequests>,
    catalog: web::Data<Vec<Advertisement>>,
    config: web::Data<AppConfig>,
    id: web::Path<Uuid>,
    req: web::Json<AskAdviceRequest>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let req = req.into_inner();

    // Claim the session's single in-flight slot before touching anything.
    let _guard = match active.try_begin(id) {
        Some(g) => g,
        None => {
            return Ok(HttpResponse::Conflict()
                .body("A request for this session is already in progress"))
        }
    };

    let conn = pool.lock().unwrap();

    if DbService::get_session(&conn, id).unwrap_or(None).is_none() {
        return Ok(HttpResponse::NotFound().body("Session not found"));
    }

    // Context window for the service call; the full transcript stays intact.
    let history = match DbService::get_turns(&conn, id, config.chat.max_history_turns as usize, 0) {
        Ok(turns) => turns,
        Err(e) => return Ok(HttpResponse::InternalServerError().body(e.to_string())),
    };

    let profile = DbService::load_profile(&conn).unwrap_or_default();

    if let Err(e) = DbService::insert_turn(&conn, id, "user", &req.text, &[]) {
        return Ok(HttpResponse::InternalServerError().body(e.to_string()));
    }

    // Release the connection lock across the slow network boundary.
    drop(conn);

    let location = geo_from(req.lat, req.lng);
    let advice = composer::ask(
        provider.as_ref().as_ref(),
        &req.text,
        &history,
        location,
        Some(&profile),
    )
    .await;

    let conn = pool.lock().unwrap();
    if let Err(e) = DbService::insert_turn(&conn, id, "assistant", &advice.text, &advice.sources) {
        return Ok(HttpResponse::InternalServerError().body(e.to_string()));
    }

    Ok(HttpResponse::Ok().json(AskAdviceResponse {
        text: advice.text,
        sources: advice.sources,
        ads: ads::rank(&catalog, &profile),
    }))
}

// --- Profile ---

#[get("/profile")]
pub async fn get_profile(pool: web::Data<DbPool>) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();

    match DbService::load_profile(&conn) {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[put("/profile")]
pub async fn put_profile(
    pool: web::Data<DbPool>,
    req: web::Json<Profile>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();
    let profile = req.into_inner();

    // Format checks are advisory: the save always goes through, the flags
    // just tell the UI what to warn about.
    let age_valid = age_is_valid(&profile.age);
    let weight_valid = weight_is_valid(&profile.weight);

    match DbService::save_profile(&conn, &profile) {
        Ok(_) => Ok(HttpResponse::Ok().json(SaveProfileResponse {
            profile,
            age_valid,
            weight_valid,
        })),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

// --- Ads & Places ---

#[get("/ads")]
pub async fn get_ads(
    pool: web::Data<DbPool>,
    catalog: web::Data<Vec<Advertisement>>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();
    let profile = DbService::load_profile(&conn).unwrap_or_default();

    Ok(HttpResponse::Ok().json(ads::rank(&catalog, &profile)))
}

#[get("/places")]
pub async fn get_places(query: web::Query<PlacesQuery>) -> WebResult<HttpResponse> {
    // No location means no overlay; degraded, not an error.
    match geo_from(query.lat, query.lng) {
        Some(center) => Ok(HttpResponse::Ok().json(places::nearby_places(center))),
        None => Ok(HttpResponse::Ok().json(Vec::<places::Place>::new())),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sessions")
            .service(create_session)
            .service(list_sessions)
            .service(get_session)
            .service(delete_session)
            .service(get_turns)
            .service(export_session)
            .service(ask_advice),
    )
    .service(get_profile)
    .service(put_profile)
    .service(get_ads)
    .service(get_places);
}
