use argus_common::{common::Pagination, error::Error, pipeline::PipelineRun};
use tracing::debug;

use crate::client::AirflowApi;

/// Materialises a DAG's complete run history by walking the paginated
/// listing window by window.
///
/// Stops as soon as a window comes back short (including empty): a
/// partial page means the listing is exhausted. If new runs land
/// upstream mid-walk the result may be skewed; the walk takes no
/// snapshot.
pub async fn fetch_all_runs(
    api: &dyn AirflowApi,
    dag_id: &str,
    page_size: u64,
) -> Result<Vec<PipelineRun>, Error> {
    let mut runs = Vec::new();
    let mut page = Pagination::first_page(page_size);

    loop {
        let batch = api.list_dag_runs(dag_id, &page).await?;
        let batch_len = batch.len() as u64;

        runs.extend(batch);

        if batch_len < page.limit {
            break;
        }

        page.advance();
    }

    debug!(dag_id, total = runs.len(), "Walked run history");

    Ok(runs)
}
