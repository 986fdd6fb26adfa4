use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::api::MarketApi;
use crate::types::{ApiRequest, AppEvent};

fn render_err(e: anyhow::Error) -> String {
    format!("{e:#}")
}

/// Perform one request and wrap the outcome as an event.
pub async fn execute<A: MarketApi + ?Sized>(api: &A, request: ApiRequest) -> AppEvent {
    match request {
        ApiRequest::Search {
            generation,
            append,
            query,
        } => AppEvent::SearchLoaded {
            generation,
            append,
            result: api.search_listings(&query).await.map_err(render_err),
        },
        ApiRequest::Listing { generation, id } => AppEvent::ListingLoaded {
            generation,
            result: api.get_listing(&id).await.map_err(render_err),
        },
        ApiRequest::Contact {
            generation,
            request,
        } => AppEvent::ContactSent {
            generation,
            result: api.contact_seller(&request).await.map_err(render_err),
        },
        ApiRequest::Categories => AppEvent::CategoriesLoaded {
            result: api.categories().await.map_err(render_err),
        },
    }
}

/// Background task serving the core's requests.
///
/// Requests run concurrently; events are sent in completion order. Runs
/// until the request channel closes and in-flight work has drained, or the
/// event receiver is gone.
pub async fn run_api_worker<A: MarketApi + ?Sized>(
    api: &A,
    mut request_rx: UnboundedReceiver<ApiRequest>,
    event_tx: UnboundedSender<AppEvent>,
) {
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, AppEvent>> = FuturesUnordered::new();
    let mut accepting = true;

    log::info!("[worker] API worker started");
    while accepting || !in_flight.is_empty() {
        tokio::select! {
            req = request_rx.recv(), if accepting => match req {
                Some(req) => {
                    log::debug!("[worker] dispatch {req:?}");
                    in_flight.push(execute(api, req).boxed_local());
                }
                None => accepting = false,
            },
            Some(ev) = in_flight.next(), if !in_flight.is_empty() => {
                if event_tx.send(ev).is_err() {
                    log::warn!("[worker] Event channel closed");
                    break;
                }
            }
        }
    }
    log::info!("[worker] API worker shutting down");
}
