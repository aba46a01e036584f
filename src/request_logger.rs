use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Start time of the request, kept in Rocket's request-local cache.
struct RequestStart(Instant);

/// Logs one line per HTTP request with status and latency.
///
/// Server errors log at `warn` so they surface under the default filter even
/// when routine traffic is silenced.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| RequestStart(Instant::now()));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let RequestStart(started) = request.local_cache(|| RequestStart(Instant::now()));
        let millis = started.elapsed().as_secs_f64() * 1000.0;
        let status = response.status();

        let level = if status.code >= 500 {
            log::Level::Warn
        } else {
            log::Level::Info
        };
        log::log!(
            level,
            "{} {} -> {} ({:.2}ms)",
            request.method(),
            request.uri(),
            status.code,
            millis
        );
    }
}
