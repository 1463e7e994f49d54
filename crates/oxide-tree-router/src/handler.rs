//! Terminal handlers and before-hooks.

use std::sync::Arc;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// A terminal handler stored in the route tree.
pub(crate) type Handler =
    Box<dyn Fn(&mut Request, &mut Response) -> Result<Option<Vec<u8>>, HandlerError> + Send + Sync>;

/// A before-hook stored in the route tree.
///
/// Hooks are shared so that mounting a router can splice its root hooks into
/// the host node.
pub(crate) type Hook =
    Arc<dyn Fn(&mut Request, &mut Response) -> Result<Flow, HandlerError> + Send + Sync>;

/// Whether dispatch goes on after a before-hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    /// Run the next hook, then the handler.
    #[default]
    Continue,
    /// Stop here and answer with the response as it stands.
    Halt,
}

/// Values a handler may return.
///
/// The produced bytes become the response body unless one was already set.
/// `()` and `None` produce no body.
pub trait IntoBody {
    /// Converts the handler's return value.
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError>;
}

impl IntoBody for () {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(None)
    }
}

impl IntoBody for &'static str {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(Some(self.as_bytes().to_vec()))
    }
}

impl IntoBody for String {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(Some(self.into_bytes()))
    }
}

impl IntoBody for Vec<u8> {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(Some(self))
    }
}

impl IntoBody for serde_json::Value {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(Some(serde_json::to_vec(&self)?))
    }
}

impl<T: IntoBody> IntoBody for Option<T> {
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        self.map_or(Ok(None), IntoBody::into_body)
    }
}

impl<T, E> IntoBody for Result<T, E>
where
    T: IntoBody,
    E: Into<HandlerError>,
{
    fn into_body(self) -> Result<Option<Vec<u8>>, HandlerError> {
        match self {
            Ok(value) => value.into_body(),
            Err(err) => Err(err.into()),
        }
    }
}

/// Values a before-hook may return.
///
/// `()` means [`Flow::Continue`].
pub trait IntoFlow {
    /// Converts the hook's return value.
    fn into_flow(self) -> Result<Flow, HandlerError>;
}

impl IntoFlow for () {
    fn into_flow(self) -> Result<Flow, HandlerError> {
        Ok(Flow::Continue)
    }
}

impl IntoFlow for Flow {
    fn into_flow(self) -> Result<Flow, HandlerError> {
        Ok(self)
    }
}

impl<T, E> IntoFlow for Result<T, E>
where
    T: IntoFlow,
    E: Into<HandlerError>,
{
    fn into_flow(self) -> Result<Flow, HandlerError> {
        match self {
            Ok(value) => value.into_flow(),
            Err(err) => Err(err.into()),
        }
    }
}

pub(crate) fn boxed_handler<F, R>(handler: F) -> Handler
where
    F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
    R: IntoBody,
{
    Box::new(move |req: &mut Request, res: &mut Response| {
        handler(req, res).into_body()
    })
}

pub(crate) fn boxed_hook<F, R>(hook: F) -> Hook
where
    F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
    R: IntoFlow,
{
    Arc::new(move |req: &mut Request, res: &mut Response| {
        hook(req, res).into_flow()
    })
}
