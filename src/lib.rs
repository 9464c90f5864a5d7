use serde::Serialize;
use worker::*;

pub mod audit;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod models;
pub mod namespace;
pub mod probe;
pub mod provision;
pub mod r2;
pub mod storage;
pub mod writer;

#[cfg(test)]
mod testing;

use audit::D1AuditSink;
use clock::{WorkerClock, WorkerTimer};
use config::ProvisionConfig;
use models::{ErrorBody, HealthResponse, ProvisionRequest, ProvisionResponse};
use provision::Provisioner;
use r2::R2Store;

const NAMESPACES_BINDING: &str = "NAMESPACES";
const PROVISIONING_DB_BINDING: &str = "PROVISIONING_DB";

type WorkerProvisioner = Provisioner<R2Store, WorkerClock, WorkerTimer, D1AuditSink>;

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = ProvisionConfig::from_env(&env).map_err(|err| Error::RustError(err.to_string()))?;
    logging::init_logging(config.log_level);

    let router = Router::with_data(config);

    router
        // health
        .get("/", |_, _| Response::ok("namespace-provisioner online"))
        .get("/health", |_, _| {
            Response::from_json(&HealthResponse {
                service: "namespace-provisioner",
                status: "ok",
            })
        })
        // first-use provisioning
        .post_async("/v1/namespaces", |mut req, ctx| async move {
            let request: ProvisionRequest = match req.json().await {
                Ok(body) => body,
                Err(err) => {
                    return json_response(400, &ProvisionResponse::bad_request(err.to_string()))
                }
            };
            let provisioner = provisioner(&ctx)?;
            let attempt_id = generate_id()?;

            let outcome = provisioner.provision(&request, &attempt_id).await;
            let (status, body) = ProvisionResponse::from_outcome(outcome);
            json_response(status, &body)
        })
        // namespace status
        .get_async("/v1/namespaces/:identifier", |_req, ctx| async move {
            let Some(identifier) = ctx.param("identifier").map(ToString::to_string) else {
                return Response::error("missing identifier", 400);
            };
            match provisioner(&ctx)?.inspect(&identifier).await {
                Ok(status) => Response::from_json(&status),
                Err(err) => json_response(err.status_code(), &ErrorBody::from(&err)),
            }
        })
        // default file contents
        .get_async("/v1/namespaces/:identifier/files/:name", |_req, ctx| async move {
            let (Some(identifier), Some(name)) = (
                ctx.param("identifier").map(ToString::to_string),
                ctx.param("name").map(ToString::to_string),
            ) else {
                return Response::error("missing identifier or file name", 400);
            };
            match provisioner(&ctx)?.read_file(&identifier, &name).await {
                Ok(Some(bytes)) => {
                    let headers = Headers::new();
                    headers.set("content-type", "application/json")?;
                    Ok(Response::from_bytes(bytes)?.with_headers(headers))
                }
                Ok(None) => Response::error("not found", 404),
                Err(err) => json_response(err.status_code(), &ErrorBody::from(&err)),
            }
        })
        .run(req, env)
        .await
}

fn provisioner(ctx: &RouteContext<ProvisionConfig>) -> Result<WorkerProvisioner> {
    let store = R2Store::new(
        ctx.env.bucket(NAMESPACES_BINDING)?,
        ctx.env.d1(PROVISIONING_DB_BINDING)?,
        WorkerClock,
    );
    let audit = D1AuditSink::new(ctx.env.d1(PROVISIONING_DB_BINDING)?);
    Ok(Provisioner::new(
        store,
        WorkerClock,
        WorkerTimer,
        audit,
        ctx.data.clone(),
    ))
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response> {
    Ok(Response::from_json(body)?.with_status(status))
}

fn generate_id() -> Result<String> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf)
        .map_err(|err| Error::RustError(format!("failed to generate id: {err}")))?;
    Ok(hex::encode(buf))
}
