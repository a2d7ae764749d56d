//! Request-scoped token propagation
//!
//! A verified token can ride along an async call chain without being passed
//! through every signature: wrap the handler in [`scope`] and read it back
//! anywhere below with [`current`].

use crate::token::Token;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static CURRENT_TOKEN: Arc<Token>;
}

/// Run `future` with `token` installed as the current token
pub async fn scope<F>(token: Arc<Token>, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_TOKEN.scope(token, future).await
}

/// Token installed by the innermost enclosing [`scope`], if any
#[must_use]
pub fn current() -> Option<Arc<Token>> {
    CURRENT_TOKEN.try_with(Arc::clone).ok()
}
