use crate::tracing_setup::tracing_init;
use easync::{AsyncController, AsyncOptions, AsyncStateStreamExt};
use futures::StreamExt;
use futures_signals::signal::Mutable;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

mod tracing_setup;

#[tokio::main]
async fn main() {
    tracing_init();

    info!("==========================================");
    warn!("A. Last request wins, slower earlier requests are ignored");

    let search = AsyncController::attach(
        |id: u64| async move {
            // Lower ids answer later, so they settle after the newer requests.
            sleep(Duration::from_millis(300 / id)).await;
            Ok::<_, String>(format!("person #{id}"))
        },
        1,
        AsyncOptions::default().on_success(|person: &String, context| {
            info!(
                "Worker | {person} settled, current: {}",
                context.is_current()
            );
        }),
    );
    let _ = search.update_args(2);
    let _ = search.update_args(3);

    search
        .to_stream()
        .until_settled()
        .for_each(|state| async move {
            info!("  Main | show state: {:?}", state);
        })
        .await;
    sleep(Duration::from_millis(400)).await;
    info!("  Main | final result: {:?}", search.result());

    info!("==========================================");
    warn!("B. Arguments bound to a signal");

    let id = Mutable::new(1u64);
    let profile = AsyncController::attach(
        |id: u64| async move {
            sleep(Duration::from_millis(50)).await;
            if id % 2 == 0 {
                Err(format!("no profile for #{id}"))
            } else {
                Ok(format!("profile #{id}"))
            }
        },
        id.get(),
        AsyncOptions::default().on_error(|err, _| error!("Worker | {err}")),
    );
    let subscription = profile.bind_args(id.signal());
    for next in 2..=3 {
        sleep(Duration::from_millis(100)).await;
        id.set(next);
    }
    sleep(Duration::from_millis(100)).await;
    subscription.abort();
    info!("  Main | profile state: {:?}", profile.state());

    info!("==========================================");
    warn!("C. URL shorthand against the people API");

    let people = AsyncController::attach_url(
        "{}/",
        vec!["1".to_string()],
        AsyncOptions::<Value>::default().on_error(|err, _| error!("Worker | {err}")),
    );
    if let Some(request) = people.current_promise() {
        match request.await {
            Ok(person) => info!("  Main | name: {}", person["name"]),
            Err(err) => warn!("  Main | request failed: {err}"),
        }
    }
    people.detach();

    info!("  Main | Finish");
}
