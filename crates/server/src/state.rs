use axum::extract::FromRef;
use query::CommentQueryEngine;
use storage::Db;

use crate::auth::TokenVerifier;

pub type Engine = CommentQueryEngine<Db>;

#[derive(Clone)]
pub struct AppState {
    pub comments: Engine,
    pub tokens: TokenVerifier,
}

impl AppState {
    pub fn new(db: Db, jwt_secret: &str) -> Self {
        Self {
            comments: CommentQueryEngine::new(db),
            tokens: TokenVerifier::new(jwt_secret),
        }
    }
}

impl FromRef<AppState> for Engine {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
