use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, guard, http::Method, web};

use crate::error::AppError;
use crate::manager::DeviceManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<DeviceManager>,
}

impl AppState {
    pub fn api_scope(&self, base_path: &str) -> actix_web::Scope {
        web::scope(base_path)
            .service(
                web::resource("/pins")
                    .route(web::get().to(list_pins))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/devices")
                    .route(web::get().to(list_devices))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}")
                    .route(web::get().to(device_descriptor))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}/state")
                    .route(web::get().to(device_state))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}/on")
                    .route(web::post().to(turn_on))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}/off")
                    .route(web::post().to(turn_off))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}/toggle")
                    .route(web::post().to(toggle))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/device/{name}/beep")
                    .route(web::post().to(beep))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
    }
}

async fn list_pins(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let pins = state.manager.list_pins().await;

    Ok(web::Json(pins))
}

async fn list_devices(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let devices = state.manager.list_devices().await?;

    Ok(web::Json(devices))
}

async fn device_descriptor(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;
    let desc = state.manager.get_device(name).await?;

    Ok(web::Json(desc))
}

async fn device_state(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;
    let device_state = state.manager.device_state(name).await?;

    Ok(web::Json(device_state))
}

async fn turn_on(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;
    let device_state = state.manager.turn_on(name).await?;

    Ok(web::Json(device_state))
}

async fn turn_off(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;
    let device_state = state.manager.turn_off(name).await?;

    Ok(web::Json(device_state))
}

async fn toggle(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;
    let device_state = state.manager.toggle(name).await?;

    Ok(web::Json(device_state))
}

async fn beep(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let name = parse_device_name(&req)?;

    state.manager.beep(name).await?;

    Ok(HttpResponse::Ok())
}

fn parse_device_name(req: &HttpRequest) -> Result<&str, AppError> {
    req.match_info()
        .get("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::InvalidValue("Missing device name".into()))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard + use<> {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
