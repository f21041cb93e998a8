//! Offset pagination over DataMall listing endpoints.

use std::future::Future;

use tracing::{info, warn};

use crate::datamall::{DataMallError, Fetched, PAGE_SIZE};

/// Records gathered by [`paginate`], with the number of pages requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub records: Vec<T>,
    pub pages: usize,
}

/// Fetch every record of a listing endpoint.
///
/// Requests pages at offsets 0, 500, 1000, ... until a page comes back
/// empty. The first failed page stops pagination: the records gathered so
/// far are returned together with the error. There is no retry.
pub async fn paginate<T, F, Fut>(endpoint: &str, mut fetch_page: F) -> Fetched<Paged<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, DataMallError>>,
{
    let mut records = Vec::new();
    let mut pages = 0;
    let mut skip = 0;

    loop {
        pages += 1;
        match fetch_page(skip).await {
            Ok(page) if page.is_empty() => break,
            Ok(page) => {
                records.extend(page);
                skip += PAGE_SIZE;
            }
            Err(e) => {
                warn!(
                    endpoint,
                    skip,
                    count = records.len(),
                    error = %e,
                    "Pagination aborted, keeping partial results"
                );
                return Fetched::partial(Paged { records, pages }, e);
            }
        }
    }

    info!(endpoint, count = records.len(), pages, "Fetched all records");
    Fetched::complete(Paged { records, pages })
}
