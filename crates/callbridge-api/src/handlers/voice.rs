//! Voice webhook handlers
//!
//! These endpoints answer the telephony provider, so they never return an
//! HTTP error body: every path renders a call-control document (a dial or a
//! spoken message) with status 200.

use crate::dto::{ApiResponse, StatusCallbackRequest, VoiceRequest};
use crate::twiml::TwimlDocument;
use actix_web::{web, HttpResponse};
use callbridge_core::models::{CallEvent, CallOutcome};
use callbridge_services::CallRouter;
use tracing::{info, instrument};

const TWIML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

fn twiml_response(outcome: &CallOutcome) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(TWIML_CONTENT_TYPE)
        .body(TwimlDocument::from(outcome).render())
}

/// Route an inbound or outbound call event
///
/// POST /voice
#[instrument(skip(router, form))]
pub async fn handle_voice(
    router: web::Data<CallRouter>,
    form: web::Form<VoiceRequest>,
) -> HttpResponse {
    let event = CallEvent::from(form.into_inner());
    let outcome = router.route(&event);
    twiml_response(&outcome)
}

/// Record a call-status push-back
///
/// POST /voice/status
///
/// Observability only: the acknowledgment is unconditional and nothing feeds
/// back into routing or reservation state.
#[instrument(skip(form))]
pub async fn call_status(form: web::Form<StatusCallbackRequest>) -> HttpResponse {
    let update = form.into_inner();
    info!(
        call_sid = update.call_sid.as_deref().unwrap_or("-"),
        call_status = update.call_status.as_deref().unwrap_or("-"),
        "Call status update"
    );

    HttpResponse::Ok().json(ApiResponse::acknowledged("Status received"))
}

/// Configure voice webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/voice")
            .route("", web::post().to(handle_voice))
            .route("/status", web::post().to(call_status)),
    );
}
