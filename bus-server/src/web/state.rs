//! Application state for the web layer.

use std::sync::Arc;

use chrono::FixedOffset;

use crate::board::RequestContext;
use crate::cache::CachedDataMall;

/// Shared application state.
pub struct AppState<A> {
    /// Cached DataMall client
    pub datamall: Arc<CachedDataMall<A>>,

    /// Local offset requests are evaluated in
    pub utc_offset: FixedOffset,
}

impl<A> AppState<A> {
    /// Create a new app state.
    pub fn new(datamall: CachedDataMall<A>, utc_offset: FixedOffset) -> Self {
        Self {
            datamall: Arc::new(datamall),
            utc_offset,
        }
    }

    /// Context for a request arriving now.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::now_in(self.utc_offset)
    }
}

// Manual impl: cloning the state never needs to clone `A`
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            datamall: self.datamall.clone(),
            utc_offset: self.utc_offset,
        }
    }
}
