use crate::catalog::Catalog;
use crate::models::AppData;
use crate::rules::RuleBook;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub catalog: Arc<Catalog>,
    pub rules: Arc<RuleBook>,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, catalog: Catalog, data: AppData) -> Self {
        let rules = Arc::new(catalog.rule_book());
        Self {
            data_path,
            catalog: Arc::new(catalog),
            rules,
            data: Arc::new(Mutex::new(data)),
        }
    }
}
