use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt as _;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::advice::composer;
use crate::advice::AdviceProvider;
use crate::api::active::ActiveRequests;
use crate::api::models::geo_from;
use crate::api::models_ws::{WsClientMessage, WsServerMessage};
use crate::config::AppConfig;
use crate::db::{service::DbService, DbPool};

#[get("/ws/advice/{session_id}")]
pub async fn ws_advice(
    req: HttpRequest,
    body: web::Payload,
    pool: web::Data<DbPool>,
    provider: web::Data<Arc<dyn AdviceProvider>>,
    active: web::Data<ActiveRequests>,
    config: web::Data<AppConfig>,
    session_id: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let id = session_id.into_inner();

    // Verify session exists before accepting connection
    {
        let conn = pool.lock().unwrap();
        if DbService::get_session(&conn, id).unwrap_or(None).is_none() {
            return Ok(HttpResponse::NotFound().body("Session not found"));
        }
    }

    info!("WebSocket connection established for session {:?}", id);

    // web::Data<T> behaves like an Arc<T>. To get the inner Arc out of Data<Arc<T>> we deref and clone.
    let provider_arc = provider.as_ref().clone();
    let pool_arc = pool.as_ref().clone();
    let active = active.as_ref().clone();
    let max_history = config.chat.max_history_turns as usize;

    actix_web::rt::spawn(async move {
        while let Some(Ok(msg)) = msg_stream.next().await {
            match msg {
                Message::Ping(bytes) => {
                    if session.pong(&bytes).await.is_err() {
                        return;
                    }
                }
                Message::Text(text) => {
                    let client_msg: Result<WsClientMessage, _> = serde_json::from_str(&text);
                    if let Ok(msg) = client_msg {
                        if msg.r#type == "message" {
                            handle_advice_message(
                                msg,
                                id,
                                pool_arc.clone(),
                                provider_arc.clone(),
                                &active,
                                max_history,
                                &mut session,
                            )
                            .await;
                        }
                    }
                }
                Message::Close(reason) => {
                    let _ = session.close(reason).await;
                    break;
                }
                _ => {}
            }
        }
        info!("WebSocket connection closed for session {:?}", id);
    });

    Ok(response)
}

async fn send_error(session: &mut actix_ws::Session, content: &str) {
    let resp = WsServerMessage {
        r#type: "error".to_string(),
        content: content.to_string(),
        sources: None,
    };
    let _ = session.text(serde_json::to_string(&resp).unwrap()).await;
}

async fn handle_advice_message(
    msg: WsClientMessage,
    session_id: Uuid,
    pool: DbPool,
    provider: Arc<dyn AdviceProvider>,
    active: &ActiveRequests,
    max_history: usize,
    session: &mut actix_ws::Session,
) {
    // Same at-most-one-in-flight rule as the REST path.
    let _guard = match active.try_begin(session_id) {
        Some(g) => g,
        None => {
            send_error(session, "A request for this session is already in progress").await;
            return;
        }
    };

    // 1. Snapshot the context and persist the user turn
    let conn = pool.lock().unwrap();

    let history = match DbService::get_turns(&conn, session_id, max_history, 0) {
        Ok(turns) => turns,
        Err(e) => {
            error!("Failed to fetch history: {}", e);
            drop(conn);
            send_error(session, "Database error").await;
            return;
        }
    };

    let profile = DbService::load_profile(&conn).unwrap_or_default();

    if let Err(e) = DbService::insert_turn(&conn, session_id, "user", &msg.content, &[]) {
        error!("Failed to insert user turn: {}", e);
        drop(conn);
        send_error(session, "Database error").await;
        return;
    }

    drop(conn);

    // 2. One network call; composer absorbs provider failures into a
    //    well-formed fallback answer.
    let location = geo_from(msg.lat, msg.lng);
    let advice = composer::ask(
        provider.as_ref(),
        &msg.content,
        &history,
        location,
        Some(&profile),
    )
    .await;

    // 3. Persist the assistant turn with its sources
    {
        let conn = pool.lock().unwrap();
        let _ = DbService::insert_turn(&conn, session_id, "assistant", &advice.text, &advice.sources);
    }

    // 4. Answer frame carries the text and the normalized citations
    let resp = WsServerMessage {
        r#type: "answer".to_string(),
        content: advice.text,
        sources: Some(advice.sources),
    };
    let _ = session.text(serde_json::to_string(&resp).unwrap()).await;
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ws_advice);
}
