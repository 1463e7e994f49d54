//! Running a matched route.

use tracing::debug;

use crate::error::HandlerError;
use crate::handler::Flow;
use crate::matcher::Outcome;
use crate::request::{Method, Request};
use crate::response::Response;

/// Applies an outcome to a request/response pair.
///
/// For a match, the before-hooks run in order and then the handler. A hook
/// returning [`Flow::Halt`] ends dispatch with the response as the hooks left
/// it. The handler's return value becomes the body only if no body was set.
///
/// A hook or handler error is returned as is; the response keeps whatever
/// earlier hooks wrote to it.
pub fn dispatch(
    outcome: Outcome<'_>,
    request: &mut Request,
    response: &mut Response,
) -> Result<(), HandlerError> {
    match outcome {
        Outcome::NotFound => response.apply(Response::not_found()),
        Outcome::MethodNotAllowed(allowed) => {
            let answer = Response::method_not_allowed().header("Allow", allow_header(&allowed));
            response.apply(answer);
        }
        Outcome::Matched(matched) => {
            request.captures = matched.captures;
            request.merge_params();

            for (i, hook) in matched.hooks.iter().enumerate() {
                if hook(&mut *request, &mut *response)? == Flow::Halt {
                    debug!(hook = i, path = %request.path, "before-hook halted dispatch");
                    return Ok(());
                }
            }

            let body = (matched.handler)(&mut *request, &mut *response)?;
            if response.body.is_none() {
                response.body = body;
            }
        }
    }
    Ok(())
}

fn allow_header(allowed: &[Method]) -> String {
    allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;

    #[test]
    fn test_not_found_sets_status_only() {
        let mut req = Request::get("/missing");
        let mut res = Response::ok().header("X-Adapter", "1");
        dispatch(Outcome::NotFound, &mut req, &mut res).unwrap();

        assert_eq!(res.status, 404);
        assert_eq!(res.body_string(), Some("Not Found".to_string()));
        assert_eq!(res.get_header("X-Adapter"), Some("1"));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let mut req = Request::delete("/");
        let mut res = Response::ok();
        let outcome = Outcome::MethodNotAllowed(vec![Method::Get, Method::Post]);
        dispatch(outcome, &mut req, &mut res).unwrap();

        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("Allow"), Some("GET, POST"));
    }

    #[test]
    fn test_explicit_body_wins_over_return_value() {
        let router = Router::build(|r| {
            r.get(|_, res| {
                res.set_body("explicit");
                "returned"
            });
        })
        .unwrap();

        let mut req = Request::get("/");
        let mut res = Response::ok();
        dispatch(router.find(Method::Get, "/"), &mut req, &mut res).unwrap();
        assert_eq!(res.body_string(), Some("explicit".to_string()));
    }

    #[test]
    fn test_halt_skips_remaining_hooks_and_handler() {
        let router = Router::build(|r| {
            r.before(|_, res| {
                res.status = 401;
                Flow::Halt
            });
            r.before(|_, _| -> Flow { panic!("second hook must not run") });
            r.get(|_, _| -> &'static str { panic!("handler must not run") });
        })
        .unwrap();

        let mut req = Request::get("/");
        let mut res = Response::ok();
        dispatch(router.find(Method::Get, "/"), &mut req, &mut res).unwrap();
        assert_eq!(res.status, 401);
        assert_eq!(res.body, None);
    }

    #[test]
    fn test_hook_error_keeps_partial_response() {
        let router = Router::build(|r| {
            r.before(|_, res| res.set_header("X-Trace", "abc"));
            r.before(|_, _| Err::<(), _>("database unavailable"));
            r.get(|_, _| "unreachable");
        })
        .unwrap();

        let mut req = Request::get("/");
        let mut res = Response::ok();
        let err = dispatch(router.find(Method::Get, "/"), &mut req, &mut res).unwrap_err();

        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(res.get_header("X-Trace"), Some("abc"));
        assert_eq!(res.body, None);
    }
}
