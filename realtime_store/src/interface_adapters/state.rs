use crate::use_cases::StoreHub;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // The single value tree shared by every connection and REST request.
    pub hub: Arc<StoreHub>,
}
