use crate::config::Config;
use crate::store::MongoDB;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub mongodb: Arc<MongoDB>,
    pub config: Config,
}
